//! Access-control decision engine.
//!
//! # Data Flow
//! ```text
//! GatewayRequest (method, path, headers, login form)
//!     → dispatcher.rs
//!         → session::CookieCodec / SessionStore (who is this?)
//!         → routing::RouteClassifier (what is this?)
//!         → session::LoginAttemptTracker + credentials.rs (login submits)
//!     → GatewayResponse (x-proxied-by, Set-Cookie, ResponseIntent)
//!     → http layer renders the intent
//! ```
//!
//! # Design Decisions
//! - The dispatcher never touches the network; it returns an intent
//! - Ordinary bad input degrades to a redirect, never an error
//! - Collaborators (credentials, clock) are injected trait objects

pub mod credentials;
pub mod dispatcher;
pub mod intent;

pub use credentials::{CredentialCheck, CredentialValidator, UserDirectory};
pub use dispatcher::RequestDispatcher;
pub use intent::{GatewayRequest, GatewayResponse, LoginForm, ResponseIntent};
