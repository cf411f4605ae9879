//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, login form)
//!     → gateway::RequestDispatcher (decision)
//!     → server.rs (forward to target) or response.rs (redirect / direct answer)
//!     → Send to client, `x-proxied-by` always attached
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::X_PROXIED_BY;
pub use server::HttpServer;
