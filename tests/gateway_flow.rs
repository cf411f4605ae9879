//! End-to-end tests: client → gateway → echo target.

use std::net::SocketAddr;

use fakeminder::config::UserConfig;
use fakeminder::Shutdown;
use reqwest::{header, StatusCode};
use serde_json::Value;

mod common;

async fn setup() -> (SocketAddr, SocketAddr, Shutdown) {
    let backend = common::start_echo_backend().await;
    let shutdown = Shutdown::new();
    let gateway = common::start_gateway(common::config(backend), &shutdown).await;
    (backend, gateway, shutdown)
}

fn session_cookie(res: &reqwest::Response) -> String {
    let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn login(client: &reqwest::Client, gateway: SocketAddr, user: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("http://{}/system/login", gateway))
        .form(&[("USER", user), ("PASSWORD", password)])
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_public_request_is_forwarded_with_proxied_by() {
    let (backend, gateway, shutdown) = setup().await;
    let res = common::client()
        .get(format!("http://{}/index.html?x=1", gateway))
        .header("sm_user", "spoofed")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-proxied-by"], backend.to_string().as_str());
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/index.html");
    assert!(body["headers"].get("sm_user").is_none());
    assert!(body["headers"].get("x-request-id").is_some());

    shutdown.trigger();
}

#[tokio::test]
async fn test_protected_without_cookie_redirects() {
    let (backend, gateway, shutdown) = setup().await;
    let res = common::client()
        .get(format!("http://{}/secure/index.html", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "/system/error/notauthenticated");
    assert_eq!(res.headers()["x-proxied-by"], backend.to_string().as_str());

    shutdown.trigger();
}

#[tokio::test]
async fn test_login_then_protected_then_logoff() {
    let (_, gateway, shutdown) = setup().await;
    let client = common::client();

    let res = login(&client, gateway, "bob", "test1234").await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "/secure/index.html");
    let cookie = session_cookie(&res);
    assert!(cookie.starts_with("SMSESSION="));

    let res = client
        .get(format!("http://{}/secure/index.html", gateway))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["headers"]["sm_user"], "bob");
    assert_eq!(body["headers"]["sm_universalid"], "bob01");

    let res = client
        .get(format!("http://{}/system/logout", gateway))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[header::SET_COOKIE].to_str().unwrap().contains("SMSESSION=LOGGEDOFF"));

    let res = client
        .get(format!("http://{}/secure/index.html", gateway))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_other_users_headers_cannot_be_spoofed() {
    let backend = common::start_echo_backend().await;
    let mut config = common::config(backend);
    config.users.insert(
        "alice".to_string(),
        UserConfig { password: "alice-pw".to_string(), auth_headers: Default::default() },
    );
    let shutdown = Shutdown::new();
    let gateway = common::start_gateway(config, &shutdown).await;
    let client = common::client();

    let res = login(&client, gateway, "alice", "alice-pw").await;
    let cookie = session_cookie(&res);

    let res = client
        .get(format!("http://{}/secure/index.html", gateway))
        .header(header::COOKIE, &cookie)
        .header("sm_universalid", "bob01")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["headers"]["sm_user"], "alice");
    assert!(body["headers"].get("sm_universalid").is_none());

    let res = client
        .get(format!("http://{}/index.html", gateway))
        .header("sm_universalid", "bob01")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert!(body["headers"].get("sm_universalid").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_bad_credentials_and_lockout() {
    let (_, gateway, shutdown) = setup().await;
    let client = common::client();

    let res = login(&client, gateway, "mallory", "x").await;
    assert_eq!(res.headers()[header::LOCATION], "/system/error/badlogin");
    assert!(!res.headers().contains_key(header::SET_COOKIE));

    let res = login(&client, gateway, "bob", "x").await;
    assert_eq!(res.headers()[header::LOCATION], "/system/error/badpassword");
    let res = login(&client, gateway, "bob", "x").await;
    assert_eq!(res.headers()[header::LOCATION], "/system/error/badpassword");
    let res = login(&client, gateway, "bob", "x").await;
    assert_eq!(res.headers()[header::LOCATION], "/system/error/accountlocked");

    let res = login(&client, gateway, "bob", "test1234").await;
    assert_eq!(res.headers()[header::LOCATION], "/system/error/accountlocked");
    assert!(!res.headers().contains_key(header::SET_COOKIE));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_target_still_carries_proxied_by() {
    // Grab a free port, then close it again.
    let dead = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let shutdown = Shutdown::new();
    let gateway = common::start_gateway(common::config(dead), &shutdown).await;

    let res = common::client()
        .get(format!("http://{}/", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.headers()["x-proxied-by"], dead.to_string().as_str());

    shutdown.trigger();
}
