//! Request classification.
//!
//! # Responsibilities
//! - Map (method, path) onto a `RouteKind`
//! - Apply the fixed precedence: logoff, login submit, protected, public
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins
//! - Login is only a submit when POSTed; a GET falls through to the page itself

use axum::http::Method;

use crate::config::TargetSiteConfig;
use crate::routing::matcher::{compile, Matcher};

/// What the gateway does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Public,
    Protected,
    LoginSubmit,
    Logoff,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Public => "public",
            RouteKind::Protected => "protected",
            RouteKind::LoginSubmit => "login_submit",
            RouteKind::Logoff => "logoff",
        }
    }
}

impl std::fmt::Display for RouteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies requests against the target site's configured paths.
#[derive(Debug)]
pub struct RouteClassifier {
    logoff_url: String,
    login_url: String,
    protected: Vec<Box<dyn Matcher>>,
}

impl RouteClassifier {
    pub fn new(site: &TargetSiteConfig) -> Self {
        Self {
            logoff_url: site.logoff_url.clone(),
            login_url: site.login_url.clone(),
            protected: site.protected_paths.iter().map(|p| compile(p)).collect(),
        }
    }

    pub fn classify(&self, method: &Method, path: &str) -> RouteKind {
        if path == self.logoff_url {
            RouteKind::Logoff
        } else if path == self.login_url && *method == Method::POST {
            RouteKind::LoginSubmit
        } else if self.protected.iter().any(|m| m.matches(path)) {
            RouteKind::Protected
        } else {
            RouteKind::Public
        }
    }
}

/// One-shot classification without keeping a compiled classifier around.
pub fn classify(method: &Method, path: &str, site: &TargetSiteConfig) -> RouteKind {
    RouteClassifier::new(site).classify(method, path)
}
