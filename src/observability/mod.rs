//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt subscriber, filtered by RUST_LOG or config)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) is attached by tower-http and is recorded on the
//!   per-request trace span (`logging::request_span`)
//! - Metric updates go through the `metrics` facade and are no-ops when no
//!   exporter is installed
//! - Auth tokens never appear in events

pub mod logging;
pub mod metrics;
