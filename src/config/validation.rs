//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and path shapes
//! - Reject header names the transport could never send
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderName;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("target_site.host must be an absolute http URL, got {0:?}")]
    InvalidHost(String),
    #[error("target_site.host must use http; TLS to the target is not supported, got {0:?}")]
    UnsupportedScheme(String),
    #[error("{field} must start with '/', got {value:?}")]
    NotAPath { field: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("target_site.max_login_attempts must be at least 1")]
    ZeroLoginAttempts,
    #[error("{context} is not a valid header name: {name:?}")]
    InvalidHeaderName { context: String, name: String },
    #[error("users.{user}.auth_headers must not set the identity header {name:?}")]
    ShadowsIdentityHeader { user: String, name: String },
    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingAdminKey,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let site = &config.target_site;

    match url::Url::parse(&site.host) {
        Ok(u) if u.scheme() == "https" => {
            errors.push(ValidationError::UnsupportedScheme(site.host.clone()));
        }
        Ok(u) if u.scheme() == "http" && site.authority().is_some() => {}
        _ => errors.push(ValidationError::InvalidHost(site.host.clone())),
    }

    for (field, value) in [
        ("target_site.login_url", &site.login_url),
        ("target_site.logoff_url", &site.logoff_url),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::NotAPath { field, value: value.clone() });
        }
    }
    for path in &site.protected_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::NotAPath {
                field: "target_site.protected_paths",
                value: path.clone(),
            });
        }
    }

    for (field, value) in [
        ("target_site.target_uri", &site.target_uri),
        ("target_site.bad_login_url", &site.bad_login_url),
        ("target_site.bad_password_url", &site.bad_password_url),
        ("target_site.account_locked_url", &site.account_locked_url),
        ("target_site.not_authenticated_url", &site.not_authenticated_url),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty(field));
        }
    }

    if site.max_login_attempts == 0 {
        errors.push(ValidationError::ZeroLoginAttempts);
    }

    if HeaderName::from_bytes(site.identity_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderName {
            context: "target_site.identity_header".to_string(),
            name: site.identity_header.clone(),
        });
    }
    for (user, entry) in &config.users {
        for name in entry.auth_headers.keys() {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidHeaderName {
                    context: format!("users.{}.auth_headers", user),
                    name: name.clone(),
                });
            }
            if name.eq_ignore_ascii_case(&site.identity_header) {
                errors.push(ValidationError::ShadowsIdentityHeader {
                    user: user.clone(),
                    name: name.clone(),
                });
            }
        }
    }

    if config.admin.enabled && config.admin.api_key.is_empty() {
        errors.push(ValidationError::MissingAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
