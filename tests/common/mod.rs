//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    Json, Router,
};
use fakeminder::config::{
    AdminConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, SessionConfig,
    TargetSiteConfig, TimeoutConfig, UserConfig,
};
use fakeminder::{HttpServer, Shutdown};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Start a target site that echoes the path and headers it received as JSON.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(|request: Request<Body>| async move { Json(echo(request.headers(), request.uri().path())) });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn echo(headers: &HeaderMap, path: &str) -> Value {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    json!({ "path": path, "headers": headers })
}

/// A complete configuration pointing at `target`.
pub fn config(target: SocketAddr) -> GatewayConfig {
    let mut auth_headers = BTreeMap::new();
    auth_headers.insert("sm_universalid".to_string(), "bob01".to_string());
    let mut users = std::collections::HashMap::new();
    users.insert(
        "bob".to_string(),
        UserConfig { password: "test1234".to_string(), auth_headers },
    );

    GatewayConfig {
        listener: ListenerConfig { bind_address: "127.0.0.1:0".to_string() },
        target_site: TargetSiteConfig {
            host: format!("http://{}", target),
            logoff_url: "/system/logout".to_string(),
            login_url: "/system/login".to_string(),
            protected_paths: vec!["/secure/*".to_string()],
            target_uri: "/secure/index.html".to_string(),
            bad_login_url: "/system/error/badlogin".to_string(),
            bad_password_url: "/system/error/badpassword".to_string(),
            account_locked_url: "/system/error/accountlocked".to_string(),
            not_authenticated_url: "/system/error/notauthenticated".to_string(),
            max_login_attempts: 3,
            identity_header: "sm_user".to_string(),
            logoff_redirect_url: None,
        },
        users,
        sessions: SessionConfig::default(),
        timeouts: TimeoutConfig::default(),
        observability: ObservabilityConfig::default(),
        admin: AdminConfig::default(),
    }
}

/// Start the gateway on an ephemeral port. Returns its address.
pub async fn start_gateway(config: GatewayConfig, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let stop = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, stop).await;
    });
    addr
}

/// A client that shows redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
