//! SMSESSION cookie parsing and serialization.

use axum::http::{header::COOKIE, HeaderMap};
use cookie::Cookie;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "SMSESSION";

/// Sentinel cookie value written on logoff.
pub const LOGGED_OFF: &str = "LOGGEDOFF";

/// Reads and writes the session cookie.
#[derive(Debug, Clone, Default)]
pub struct CookieCodec {
    domain: Option<String>,
}

impl CookieCodec {
    pub fn new(domain: Option<String>) -> Self {
        Self {
            domain: domain.filter(|d| !d.is_empty()),
        }
    }

    /// Find the `SMSESSION` value across all `cookie` headers.
    ///
    /// The name match is case-sensitive. Malformed cookies are skipped and an
    /// empty value counts as absent.
    pub fn extract_session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(|cookie| match cookie {
                Ok(c) => Some(c),
                Err(e) => {
                    tracing::debug!("ignoring malformed cookie: {e}");
                    None
                }
            })
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .map(|cookie| cookie.value_trimmed().to_string())
            .filter(|value| !value.is_empty())
    }

    /// `Set-Cookie` value binding the browser to session `id`.
    pub fn session_cookie(&self, id: &str) -> String {
        self.build(id.to_string()).to_string()
    }

    /// `Set-Cookie` value marking the browser's session as terminated.
    pub fn logoff_cookie(&self) -> String {
        self.build(LOGGED_OFF.to_string()).to_string()
    }

    fn build(&self, value: String) -> Cookie<'static> {
        let builder = Cookie::build((SESSION_COOKIE, value)).path("/");
        match &self.domain {
            Some(domain) => builder.domain(domain.clone()).build(),
            None => builder.build(),
        }
    }
}
