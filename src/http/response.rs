//! Response handling and transformation.
//!
//! # Responsibilities
//! - Render non-forward intents as responses
//! - Attach the dispatcher's `x-proxied-by` and `Set-Cookie` headers
//! - Map upstream failures to 502
//!
//! # Design Decisions
//! - Redirects are `302 Found`, matching what browsers expect from an SSO agent
//! - Header values the transport cannot carry are logged and dropped

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::gateway::{GatewayResponse, ResponseIntent};

/// Header naming the gateway that handled the request.
pub const X_PROXIED_BY: HeaderName = HeaderName::from_static("x-proxied-by");

/// Build the response for a `Redirect` or `Respond` intent.
///
/// `Forward` intents are the server's job; they render as 502 here.
pub fn render(intent: &ResponseIntent) -> Response {
    match intent {
        ResponseIntent::Redirect { location } => match HeaderValue::from_str(location) {
            Ok(value) => {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::FOUND;
                response.headers_mut().insert(header::LOCATION, value);
                response
            }
            Err(_) => {
                tracing::error!(location = %location, "Redirect target is not a valid header value");
                bad_gateway("Invalid redirect target")
            }
        },
        ResponseIntent::Respond { status, body } => (*status, body.clone()).into_response(),
        ResponseIntent::Forward { .. } => bad_gateway("Nothing to forward"),
    }
}

/// Add the decision's response headers.
pub fn apply_decision_headers(response: &mut Response, decision: &GatewayResponse) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&decision.proxied_by) {
        headers.insert(X_PROXIED_BY, value);
    }
    if let Some(cookie) = &decision.set_cookie {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(_) => tracing::error!(cookie = %cookie, "Dropping unencodable Set-Cookie"),
        }
    }
}

pub fn bad_gateway(message: &'static str) -> Response {
    (StatusCode::BAD_GATEWAY, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect() {
        let response = render(&ResponseIntent::Redirect { location: "/login".to_string() });
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[test]
    fn test_decision_headers() {
        let decision = GatewayResponse {
            proxied_by: "localhost:8000".to_string(),
            set_cookie: Some("SMSESSION=LOGGEDOFF; Path=/".to_string()),
            intent: ResponseIntent::Respond { status: StatusCode::OK, body: "bye".to_string() },
        };
        let mut response = render(&decision.intent);
        apply_decision_headers(&mut response, &decision);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_PROXIED_BY], "localhost:8000");
        assert_eq!(response.headers()[header::SET_COOKIE], "SMSESSION=LOGGEDOFF; Path=/");
    }
}
