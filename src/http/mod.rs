//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → handlers.rs (method, identity, token, content type, body)
//!     → request.rs (identity and header extraction)
//!     → dispatch subsystem (processor queue, reply channel)
//!     → response.rs (refusals and dispatch failures)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::AppState;
pub use request::{Endpoint, UUID_HEADER, X_AUTH_TOKEN};
pub use response::ApiError;
pub use server::HttpServer;
