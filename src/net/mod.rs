//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → listener.rs (bind plain TCP; failure is fatal)
//!     → tls.rs (load PEM material when [listener.tls] is set)
//!     → Hand off to HTTP layer
//! ```

pub mod listener;
pub mod tls;

pub use listener::{bind, ListenerError};
