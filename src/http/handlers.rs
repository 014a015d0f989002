//! Submission handlers.
//!
//! Every submission runs the same checks, in this order, and stops at the
//! first failure without touching the processor queue:
//!
//! ```text
//! method == POST                 else 501
//! identity parses                else 404 (path) / 400 (header)
//! identity in auth table         else 404
//! X-Auth-Token matches           else 401
//! Content-Type fits endpoint     else 400
//! body readable (and JSON)       else 400
//!     → dispatch → relay processor reply
//! ```

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, Request, State},
    http::Method,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::canonical::canonicalize;
use crate::dispatch::{Dispatcher, OutboundResponse};
use crate::http::request::{self, Endpoint};
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::security::{AuthOutcome, AuthTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthTable>,
    pub dispatcher: Dispatcher,
    pub max_body_size: usize,
}

/// Identity segment as extracted from the path. A segment that does not
/// decode is kept as a rejection so it is reported after the method check.
type PathSegment = Result<Path<String>, PathRejection>;

pub async fn submit_json_by_path(
    State(state): State<AppState>,
    segment: PathSegment,
    request: Request,
) -> Response {
    handle(&state, Endpoint::Json, Some(segment), request).await
}

pub async fn submit_hash_by_path(
    State(state): State<AppState>,
    segment: PathSegment,
    request: Request,
) -> Response {
    handle(&state, Endpoint::Hash, Some(segment), request).await
}

pub async fn submit_json_by_header(State(state): State<AppState>, request: Request) -> Response {
    handle(&state, Endpoint::Json, None, request).await
}

pub async fn submit_hash_by_header(State(state): State<AppState>, request: Request) -> Response {
    handle(&state, Endpoint::Hash, None, request).await
}

/// Liveness check.
pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for paths outside the submission routes.
pub async fn not_found(method: Method) -> ApiError {
    tracing::debug!(method = %method, "No route matched");
    metrics::record_rejection(ApiError::NoRoute.reason());
    ApiError::NoRoute
}

async fn handle(
    state: &AppState,
    endpoint: Endpoint,
    path_identity: Option<PathSegment>,
    request: Request,
) -> Response {
    let start = Instant::now();

    let response = match submit(state, endpoint, path_identity, request).await {
        Ok(reply) => reply.into_response(),
        Err(e) => {
            if matches!(e, ApiError::Dispatch(_)) {
                tracing::warn!(endpoint = endpoint.label(), error = %e, "Submission failed");
            } else {
                tracing::info!(endpoint = endpoint.label(), error = %e, "Submission rejected");
                metrics::record_rejection(e.reason());
            }
            e.into_response()
        }
    };

    metrics::record_request(endpoint.label(), response.status().as_u16(), start);
    response
}

async fn submit(
    state: &AppState,
    endpoint: Endpoint,
    path_identity: Option<PathSegment>,
    request: Request,
) -> Result<OutboundResponse, ApiError> {
    if request.method() != Method::POST {
        return Err(ApiError::NotImplemented(request.method().clone()));
    }

    let identity = match path_identity {
        Some(Ok(Path(segment))) => request::path_identity(&segment)?,
        Some(Err(rejection)) => {
            tracing::debug!(error = %rejection, "Undecodable identity segment");
            return Err(ApiError::MalformedIdentityPath);
        }
        None => request::header_identity(request.headers())?,
    };

    match state
        .auth
        .authenticate(&identity, request::auth_token(request.headers()))
    {
        AuthOutcome::Success => {}
        AuthOutcome::UnknownIdentity => return Err(ApiError::UnknownIdentity),
        AuthOutcome::Failure => return Err(ApiError::Unauthorized),
    }

    if !request::content_type_matches(request.headers(), endpoint.content_type()) {
        return Err(ApiError::WrongContentType(endpoint.content_type()));
    }

    let body = axum::body::to_bytes(request.into_body(), state.max_body_size)
        .await
        .map_err(|e| ApiError::BodyRead(e.to_string()))?;

    let payload = match endpoint {
        Endpoint::Json => Bytes::from(canonicalize(&body)?),
        Endpoint::Hash if body.is_empty() => return Err(ApiError::EmptyPayload),
        Endpoint::Hash => body,
    };

    tracing::info!(
        %identity,
        endpoint = endpoint.label(),
        size = payload.len(),
        "Submission accepted"
    );

    let reply = state
        .dispatcher
        .dispatch(identity, payload, endpoint.already_hashed())
        .await?;

    tracing::debug!(%identity, status = %reply.status, "Relaying processor reply");
    Ok(reply)
}
