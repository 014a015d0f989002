//! Messages exchanged with the external processor.

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::sync::oneshot;
use uuid::Uuid;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const HASH_CONTENT_TYPE: &str = "application/octet-stream";

/// A validated request handed to the processor.
///
/// Carries its own reply channel; the processor answers by calling
/// [`ReplySender::send`] exactly once.
#[derive(Debug)]
pub struct InboundMessage {
    /// Caller the payload belongs to.
    pub identity: Uuid,
    /// Canonical JSON bytes, or the raw hash for pre-hashed submissions.
    pub payload: Bytes,
    /// Whether `payload` is already a hash.
    pub already_hashed: bool,
    /// Where the single response must be sent.
    pub reply: ReplySender,
}

impl InboundMessage {
    /// Split into the request data and the reply channel.
    pub fn into_parts(self) -> (Submission, ReplySender) {
        let submission = Submission {
            identity: self.identity,
            payload: self.payload,
            already_hashed: self.already_hashed,
        };
        (submission, self.reply)
    }
}

/// The data part of an [`InboundMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub identity: Uuid,
    pub payload: Bytes,
    pub already_hashed: bool,
}

impl Submission {
    /// Media type the payload was submitted with.
    pub fn content_type(&self) -> &'static str {
        if self.already_hashed {
            HASH_CONTENT_TYPE
        } else {
            JSON_CONTENT_TYPE
        }
    }
}

/// One-shot sink for the processor's response.
///
/// `send` consumes the sender, so a message can be answered at most once.
#[derive(Debug)]
pub struct ReplySender {
    tx: oneshot::Sender<OutboundResponse>,
}

impl ReplySender {
    /// Deliver the response. Gives it back if the requester has gone away
    /// (timed out, abandoned, or the client disconnected).
    pub fn send(self, response: OutboundResponse) -> Result<(), OutboundResponse> {
        self.tx.send(response)
    }

    /// Whether the requester has stopped waiting.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a connected reply sender/receiver pair.
pub(crate) fn reply_channel() -> (ReplySender, oneshot::Receiver<OutboundResponse>) {
    let (tx, rx) = oneshot::channel();
    (ReplySender { tx }, rx)
}

/// The processor's answer, relayed verbatim to the HTTP client.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Append a header value, keeping any existing values for `name`.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
