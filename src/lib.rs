//! ubirch HTTP front-end library

// Core subsystems
pub mod canonical;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod net;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::GatewayConfig;
pub use dispatch::{Dispatcher, InboundMessage, OutboundResponse};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
