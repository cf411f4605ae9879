//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → target site shared via Arc with the dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the dispatcher never sees a change
//! - Ambient sections have defaults, the target site does not
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, SessionConfig,
    TargetSiteConfig, TimeoutConfig, UserConfig,
};
pub use validation::{validate_config, ValidationError};
