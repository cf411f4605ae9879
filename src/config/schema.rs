//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    #[serde(default)]
    pub listener: ListenerConfig,

    /// The protected site sitting behind the gateway.
    pub target_site: TargetSiteConfig,

    /// Known users, keyed by login name.
    #[serde(default)]
    pub users: HashMap<String, UserConfig>,

    /// Session cookie and expiry settings.
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Timeout configuration.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// The target site and the policy paths the gateway enforces for it.
///
/// Everything except `identity_header` and `logoff_redirect_url` is required.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetSiteConfig {
    /// Upstream origin, scheme included (e.g., "http://localhost:8000").
    pub host: String,

    /// Path that ends the current session.
    pub logoff_url: String,

    /// Path the login form is POSTed to.
    pub login_url: String,

    /// Paths that require a session. Entries ending in `/*` match a subtree.
    pub protected_paths: Vec<String>,

    /// Where a successful login lands.
    pub target_uri: String,

    /// Redirect for an unknown user.
    pub bad_login_url: String,

    /// Redirect for a known user with the wrong password.
    pub bad_password_url: String,

    /// Redirect once the attempt limit is reached.
    pub account_locked_url: String,

    /// Redirect for protected requests without a session.
    pub not_authenticated_url: String,

    /// Consecutive failures before an identity is locked.
    pub max_login_attempts: u32,

    /// Header carrying the user name to the target site.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,

    /// If set, logoff redirects here instead of answering directly.
    #[serde(default)]
    pub logoff_redirect_url: Option<String>,
}

fn default_identity_header() -> String {
    "sm_user".to_string()
}

/// A user known to the built-in identity source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub password: String,

    /// Extra identity headers forwarded for this user's sessions.
    #[serde(default)]
    pub auth_headers: BTreeMap<String, String>,
}

/// Session cookie and lifetime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Optional `Domain` attribute for the session cookie.
    pub cookie_domain: Option<String>,

    /// Sliding idle timeout in seconds (0 = sessions never idle out).
    pub idle_timeout_secs: u64,

    /// How often idle sessions are swept from the store.
    pub purge_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_domain: None,
            idle_timeout_secs: 1200,
            purge_interval_secs: 60,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            bind_address: "127.0.0.1:8001".to_string(),
        }
    }
}

impl TargetSiteConfig {
    /// The target's `host:port`, scheme stripped.
    ///
    /// A missing port falls back to the scheme default. Returns `None` when
    /// `host` is not an absolute URL with a host component.
    pub fn authority(&self) -> Option<String> {
        let url = url::Url::parse(&self.host).ok()?;
        let host = url.host_str()?;
        match url.port_or_known_default() {
            Some(port) => Some(format!("{}:{}", host, port)),
            None => Some(host.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(host: &str) -> TargetSiteConfig {
        TargetSiteConfig {
            host: host.to_string(),
            logoff_url: "/system/logout".to_string(),
            login_url: "/system/login".to_string(),
            protected_paths: Vec::new(),
            target_uri: "/".to_string(),
            bad_login_url: "/bad".to_string(),
            bad_password_url: "/bad".to_string(),
            account_locked_url: "/locked".to_string(),
            not_authenticated_url: "/login".to_string(),
            max_login_attempts: 3,
            identity_header: default_identity_header(),
            logoff_redirect_url: None,
        }
    }

    #[test]
    fn test_authority_strips_scheme() {
        assert_eq!(site("http://localhost:8000").authority().as_deref(), Some("localhost:8000"));
        assert_eq!(site("http://localhost:8000/app").authority().as_deref(), Some("localhost:8000"));
    }

    #[test]
    fn test_authority_uses_default_port() {
        assert_eq!(site("http://example.com").authority().as_deref(), Some("example.com:80"));
        assert_eq!(site("https://example.com").authority().as_deref(), Some("example.com:443"));
    }

    #[test]
    fn test_authority_rejects_relative_host() {
        assert!(site("localhost").authority().is_none());
        assert!(site("not a url").authority().is_none());
    }
}
