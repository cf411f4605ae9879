//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Turn an inbound axum request into a `GatewayRequest`
//! - Parse the login form body for login submits
//!
//! # Design Decisions
//! - Only login submits have their body read; everything else streams through
//! - An unreadable form is an empty form, never a 4xx

use axum::{
    body::Body,
    extract::{Form, FromRequest},
    http::{HeaderMap, HeaderName, Request},
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::gateway::LoginForm;

/// Header carrying the correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that stamps a UUID on requests arriving without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that echoes the request ID back on the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// The request's correlation ID, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Parse a urlencoded login form from a request body.
pub async fn read_login_form(headers: &HeaderMap, body: Body, request_id: &str) -> LoginForm {
    let mut request = Request::post("/").body(body).unwrap_or_default();
    *request.headers_mut() = headers.clone();

    match Form::<LoginForm>::from_request(request, &()).await {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(request_id = %request_id, error = %rejection, "Unreadable login form");
            LoginForm::default()
        }
    }
}
