//! Path matching logic.
//!
//! # Responsibilities
//! - Match a request path exactly (the default)
//! - Match a path subtree for entries written as `/prefix/*`
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching
//! - Query strings never reach the matchers

/// Trait for matching request paths against a configured entry.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this entry.
    fn matches(&self, path: &str) -> bool;
}

/// Matches one path exactly.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Compile a configured protected-path entry.
///
/// `/secure/*` becomes a prefix matcher on `/secure/`; anything else is exact.
pub fn compile(entry: &str) -> Box<dyn Matcher> {
    match entry.strip_suffix('*') {
        Some(prefix) if prefix.ends_with('/') => Box::new(PathPrefixMatcher::new(prefix)),
        _ => Box::new(ExactPathMatcher::new(entry)),
    }
}
