//! Session state subsystem.
//!
//! # Data Flow
//! ```text
//! Request `cookie` header
//!     → cookie.rs (extract SMSESSION value)
//!     → store.rs (id → Session, empty session on miss)
//!
//! Login submit
//!     → attempts.rs (failure counting, lockout)
//!     → store.rs (new session on success)
//!     → cookie.rs (Set-Cookie value)
//! ```
//!
//! # Design Decisions
//! - Absence is data: lookups return the empty session, never an error
//! - Stores hand out copies, never references into the map
//! - Per-key mutation is serialized by DashMap's shard locks
//! - Time comes from an injected `Clock` so tests control expiry

pub mod attempts;
pub mod clock;
pub mod cookie;
pub mod store;

pub use attempts::{LockState, LoginAttemptRecord, LoginAttemptTracker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cookie::{CookieCodec, LOGGED_OFF, SESSION_COOKIE};
pub use store::{Session, SessionStore};
