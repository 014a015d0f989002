//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → http::request (extract identity and X-Auth-Token)
//!     → auth.rs (identity known? token matches?)
//!     → Pass to canonicalization / dispatch
//! ```
//!
//! # Design Decisions
//! - Fail closed: an unknown identity or mismatched token never reaches the
//!   processor queue
//! - Tokens are wrapped in `Secret` so they cannot leak through logging

pub mod auth;
pub mod secret;

pub use auth::{AuthError, AuthOutcome, AuthTable};
pub use secret::Secret;
