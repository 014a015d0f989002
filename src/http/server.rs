//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum router for the configured identity mode and prefix
//! - Wire up middleware (body read timeout, request ID, tracing)
//! - Serve on a bound listener, plain or TLS
//! - Drain on shutdown, bounded by the grace period
//!
//! The body read timeout only covers receiving the request body. Waiting on
//! the processor is bounded by the dispatcher alone.

use axum::{
    body::Body,
    routing::{any, get},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::RequestBodyTimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, IdentitySource};
use crate::dispatch::Dispatcher;
use crate::http::handlers::{self, AppState};
use crate::lifecycle::{ServerState, ShutdownSignal, StateHandle};
use crate::observability::logging;
use crate::security::AuthTable;

/// Extra time after the grace period for abandoned requests to be answered.
const ABANDON_SLACK: Duration = Duration::from_secs(1);

/// HTTP front-end of the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    state: StateHandle,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig, auth: AuthTable, dispatcher: Dispatcher) -> Self {
        let state = AppState {
            auth: Arc::new(auth),
            dispatcher,
            max_body_size: config.api.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            state: StateHandle::new(),
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let prefix = config.api.prefix.as_str();

        let submissions = match config.api.identity_source {
            IdentitySource::Path => Router::new()
                .route(
                    &format!("{prefix}/{{uuid}}"),
                    any(handlers::submit_json_by_path),
                )
                .route(
                    &format!("{prefix}/{{uuid}}/hash"),
                    any(handlers::submit_hash_by_path),
                ),
            IdentitySource::Header => Router::new()
                .route(&format!("{prefix}/"), any(handlers::submit_json_by_header))
                .route(
                    &format!("{prefix}/hash"),
                    any(handlers::submit_hash_by_header),
                ),
        };

        submissions
            .route("/health", get(handlers::health))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(RequestBodyTimeoutLayer::new(Duration::from_secs(
                config.timeouts.body_read_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(logging::request_span::<Body>))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle observing the lifecycle state.
    pub fn state(&self) -> StateHandle {
        self.state.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires and the drain
    /// completes or the grace period runs out.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        let grace = self.config.lifecycle.shutdown_grace();
        let state = self.state;

        state.advance(ServerState::Serving);
        tracing::info!(address = %addr, "HTTP server starting");

        let server = axum::serve(listener, self.router)
            .with_graceful_shutdown({
                let mut shutdown = shutdown.clone();
                let state = state.clone();
                async move {
                    shutdown.recv().await;
                    state.advance(ServerState::ShuttingDown);
                }
            })
            .into_future();

        let deadline = {
            let mut shutdown = shutdown;
            async move {
                shutdown.recv().await;
                tokio::time::sleep(grace + ABANDON_SLACK).await;
            }
        };

        let result = tokio::select! {
            result = server => result,
            () = deadline => {
                tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, closing remaining connections");
                Ok(())
            }
        };

        state.advance(ServerState::Stopped);
        tracing::info!("HTTP server stopped");
        result
    }

    /// Serve HTTPS on `address`.
    pub async fn run_tls(
        self,
        address: SocketAddr,
        tls: RustlsConfig,
        shutdown: ShutdownSignal,
    ) -> std::io::Result<()> {
        let grace = self.config.lifecycle.shutdown_grace();
        let state = self.state;
        let handle = axum_server::Handle::new();

        tokio::spawn({
            let handle = handle.clone();
            let state = state.clone();
            let mut shutdown = shutdown;
            async move {
                shutdown.recv().await;
                state.advance(ServerState::ShuttingDown);
                handle.graceful_shutdown(Some(grace + ABANDON_SLACK));
            }
        });

        state.advance(ServerState::Serving);
        tracing::info!(address = %address, "HTTPS server starting");

        let result = axum_server::bind_rustls(address, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await;

        state.advance(ServerState::Stopped);
        tracing::info!("HTTPS server stopped");
        result
    }
}
