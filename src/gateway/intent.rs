//! Dispatcher input and output values.

use axum::http::{HeaderMap, Method, StatusCode};
use serde::Deserialize;

/// Fields of a login form submission.
///
/// Accepts both lowercase names and the `USER`/`PASSWORD` names SiteMinder
/// login forms use. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginForm {
    #[serde(default, alias = "USER")]
    pub user: String,
    #[serde(default, alias = "PASSWORD")]
    pub password: String,
}

impl LoginForm {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

/// What the dispatcher needs to know about an inbound request.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    /// Path only, no query string.
    pub path: String,
    pub headers: HeaderMap,
    /// Parsed body, present only for login submits.
    pub login: Option<LoginForm>,
}

impl GatewayRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            login: None,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_login(mut self, form: LoginForm) -> Self {
        self.login = Some(form);
        self
    }
}

/// How the transport should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseIntent {
    /// Proxy to the target, adding these headers to the upstream request.
    Forward { identity_headers: Vec<(String, String)> },
    /// `302 Found` to `location`.
    Redirect { location: String },
    /// Answer directly without contacting the target.
    Respond { status: StatusCode, body: String },
}

/// The dispatcher's full decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    /// Value for the `x-proxied-by` response header.
    pub proxied_by: String,
    /// Value for a `Set-Cookie` response header.
    pub set_cookie: Option<String>,
    pub intent: ResponseIntent,
}

impl GatewayResponse {
    pub fn is_forward(&self) -> bool {
        matches!(self.intent, ResponseIntent::Forward { .. })
    }

    pub fn redirect_location(&self) -> Option<&str> {
        match &self.intent {
            ResponseIntent::Redirect { location } => Some(location),
            _ => None,
        }
    }
}
