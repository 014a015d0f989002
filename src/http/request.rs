//! Request inspection helpers.
//!
//! # Responsibilities
//! - Determine which submission endpoint a request targets
//! - Extract the caller identity from the path or the `UUID` header
//! - Read the presented auth token
//! - Match the declared content type against the endpoint's
//!
//! # Design Decisions
//! - Pure functions over `HeaderMap` and path text so they can be tested
//!   without a running server
//! - Content-type parameters (charset etc.) are ignored; the media type is
//!   compared case-insensitively

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use uuid::Uuid;

use crate::dispatch::{HASH_CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::http::response::ApiError;

/// Header carrying the caller's shared secret.
pub const X_AUTH_TOKEN: &str = "x-auth-token";

/// Header carrying the caller identity in header mode.
pub const UUID_HEADER: &str = "uuid";

/// The two submission variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Structured JSON payload, canonicalized before dispatch.
    Json,
    /// Pre-hashed payload, forwarded unchanged.
    Hash,
}

impl Endpoint {
    pub fn content_type(self) -> &'static str {
        match self {
            Endpoint::Json => JSON_CONTENT_TYPE,
            Endpoint::Hash => HASH_CONTENT_TYPE,
        }
    }

    pub fn already_hashed(self) -> bool {
        matches!(self, Endpoint::Hash)
    }

    /// Label used for metrics and logs.
    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Json => "json",
            Endpoint::Hash => "hash",
        }
    }
}

/// Identity taken from a path segment. Anything unparsable is a 404.
pub fn path_identity(segment: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(segment).map_err(|_| ApiError::MalformedIdentityPath)
}

/// Identity taken from the `UUID` header.
pub fn header_identity(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get(UUID_HEADER)
        .ok_or(ApiError::MissingIdentityHeader)?
        .to_str()
        .map_err(|e| ApiError::MalformedIdentityHeader(e.to_string()))?;
    if raw.is_empty() {
        return Err(ApiError::MissingIdentityHeader);
    }
    Uuid::parse_str(raw).map_err(|e| ApiError::MalformedIdentityHeader(e.to_string()))
}

/// Presented token; a missing or non-ASCII header counts as empty.
pub fn auth_token(headers: &HeaderMap) -> &str {
    headers
        .get(X_AUTH_TOKEN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Whether the declared content type is `expected`.
pub fn content_type_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get_all(CONTENT_TYPE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| {
            let media_type = value.split(';').next().unwrap_or_default().trim();
            media_type.eq_ignore_ascii_case(expected)
        })
}
