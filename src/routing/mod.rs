//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → classifier.rs (precedence rules)
//!     → matcher.rs (protected path entries)
//!     → Return: RouteKind
//!
//! Compilation (at startup):
//!     TargetSiteConfig.protected_paths
//!     → Compile matchers (exact by default, `/*` subtrees)
//!     → Freeze as immutable RouteClassifier
//! ```
//!
//! # Design Decisions
//! - Classifier compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always yields the same kind

pub mod classifier;
pub mod matcher;

pub use classifier::{classify, RouteClassifier, RouteKind};
