//! Admin API for inspecting and nudging gateway state.
//!
//! Tests driving the gateway use it to look at sessions and clear lockouts.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::gateway::RequestDispatcher;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub dispatcher: RequestDispatcher,
    pub api_key: String,
}

pub fn setup_admin_router(dispatcher: RequestDispatcher, api_key: String) -> Router {
    let state = AdminState { dispatcher, api_key };
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/sessions", get(get_sessions))
        .route("/admin/sessions/{id}", delete(delete_session))
        .route("/admin/lockouts", get(get_lockouts))
        .route("/admin/lockouts/{user}/reset", post(reset_lockout))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetSiteConfig;
    use crate::gateway::UserDirectory;
    use crate::session::{ManualClock, Session};
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Method, Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn dispatcher() -> RequestDispatcher {
        let site = TargetSiteConfig {
            host: "http://localhost:8000".to_string(),
            logoff_url: "/system/logout".to_string(),
            login_url: "/system/login".to_string(),
            protected_paths: Vec::new(),
            target_uri: "/".to_string(),
            bad_login_url: "/bad".to_string(),
            bad_password_url: "/bad".to_string(),
            account_locked_url: "/locked".to_string(),
            not_authenticated_url: "/login".to_string(),
            max_login_attempts: 1,
            identity_header: "sm_user".to_string(),
            logoff_redirect_url: None,
        };
        RequestDispatcher::new(site, Arc::new(UserDirectory::default()), Arc::new(ManualClock::new(0))).unwrap()
    }

    fn request(method: Method, uri: &str, key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", key));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_requires_api_key() {
        let app = setup_admin_router(dispatcher(), "secret".to_string());

        let res = app.clone().oneshot(request(Method::GET, "/admin/status", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app.clone().oneshot(request(Method::GET, "/admin/status", Some("wrong"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app.oneshot(request(Method::GET, "/admin/status", Some("secret"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sessions_listing_and_revocation() {
        let d = dispatcher();
        d.sessions().put(Session { id: "abc".to_string(), user: "bob".to_string(), ..Session::default() });
        let app = setup_admin_router(d.clone(), "secret".to_string());

        let res = app.clone().oneshot(request(Method::GET, "/admin/sessions", Some("secret"))).await.unwrap();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json[0]["user"], "bob");

        let res = app.clone().oneshot(request(Method::DELETE, "/admin/sessions/abc", Some("secret"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(d.sessions().is_empty());

        let res = app.oneshot(request(Method::DELETE, "/admin/sessions/abc", Some("secret"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_lockout_reset() {
        let d = dispatcher();
        d.attempts().record_failure("bob");
        assert!(d.attempts().is_locked("bob"));
        let app = setup_admin_router(d.clone(), "secret".to_string());

        let res = app.clone().oneshot(request(Method::GET, "/admin/lockouts", Some("secret"))).await.unwrap();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["max_login_attempts"], 1);
        assert_eq!(json["records"][0]["identity"], "bob");

        let res = app.oneshot(request(Method::POST, "/admin/lockouts/bob/reset", Some("secret"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(!d.attempts().is_locked("bob"));
    }
}
