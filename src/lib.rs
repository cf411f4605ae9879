//! Cookie-based single-sign-on gateway test double.
//!
//! Sits in front of a target site the way an SSO policy agent does: it owns
//! the `SMSESSION` cookie, guards protected paths, runs the login/logoff and
//! lockout flow, and forwards authenticated traffic with identity headers.

pub mod admin;
pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod session;

pub use config::GatewayConfig;
pub use gateway::RequestDispatcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
