//! Structured logging.
//!
//! Uses the tracing crate with a fmt subscriber. `RUST_LOG` takes precedence
//! over the configured level.

use axum::http::Request;
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const X_REQUEST_ID: &str = "x-request-id";

/// Default filter directive for a configured log level.
pub fn default_directive(log_level: &str) -> String {
    format!("ubirch_gateway={log_level},tower_http={log_level}")
}

/// Install the global tracing subscriber.
///
/// Call once, before anything logs.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Span for one HTTP request, tagged with its `x-request-id`.
pub fn request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = request_id(request),
    )
}

/// The request ID set by the request-id layer, or `-` when absent.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}
