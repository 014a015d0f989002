//! Error responses.
//!
//! # Responsibilities
//! - Map every refusal and dispatch failure to its HTTP status
//! - Render client errors as short `text/plain` bodies
//!
//! # Design Decisions
//! - Identity problems on the path surface as 404 so unknown and malformed
//!   identities look the same to a caller
//! - An abandoned dispatch answers with an empty body and `Connection: close`
//!   rather than inventing content

use axum::{
    body::Body,
    http::{
        header::{CONNECTION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
};

use crate::canonical::CanonicalError;
use crate::dispatch::DispatchError;

/// Everything that stops a request from producing a processor reply.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not implemented")]
    NotImplemented(Method),

    #[error("Not Found")]
    MalformedIdentityPath,

    #[error("missing UUID header")]
    MissingIdentityHeader,

    #[error("error parsing UUID: {0}")]
    MalformedIdentityHeader(String),

    #[error("Not Found")]
    UnknownIdentity,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("wrong content type: expected {0}")]
    WrongContentType(&'static str),

    #[error("error reading request body: {0}")]
    BodyRead(String),

    #[error("request body is empty")]
    EmptyPayload,

    #[error("error parsing request body: {0}")]
    MalformedJson(#[from] CanonicalError),

    #[error("Not Found")]
    NoRoute,

    #[error("{0}")]
    Dispatch(#[from] DispatchError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::MalformedIdentityPath | ApiError::UnknownIdentity | ApiError::NoRoute => {
                StatusCode::NOT_FOUND
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MissingIdentityHeader
            | ApiError::MalformedIdentityHeader(_)
            | ApiError::WrongContentType(_)
            | ApiError::BodyRead(_)
            | ApiError::EmptyPayload
            | ApiError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Dispatch(e) => match e {
                DispatchError::QueueClosed | DispatchError::Abandoned => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                DispatchError::ReplyDropped => StatusCode::BAD_GATEWAY,
                DispatchError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            },
        }
    }

    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::NotImplemented(_) => "method",
            ApiError::MalformedIdentityPath => "malformed_identity",
            ApiError::MissingIdentityHeader => "missing_identity",
            ApiError::MalformedIdentityHeader(_) => "malformed_identity",
            ApiError::UnknownIdentity => "unknown_identity",
            ApiError::Unauthorized => "unauthorized",
            ApiError::WrongContentType(_) => "content_type",
            ApiError::BodyRead(_) => "body_read",
            ApiError::EmptyPayload => "empty_payload",
            ApiError::MalformedJson(_) => "malformed_json",
            ApiError::NoRoute => "no_route",
            ApiError::Dispatch(e) => e.outcome(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Dispatch(DispatchError::Abandoned) = self {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = self.status();
            response
                .headers_mut()
                .insert(CONNECTION, HeaderValue::from_static("close"));
            return response;
        }

        (
            self.status(),
            [(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
            self.to_string(),
        )
            .into_response()
    }
}
