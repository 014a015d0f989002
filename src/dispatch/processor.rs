//! Consumer side of the processor queue.
//!
//! The signing backend is not part of this crate. It plugs in as a handler
//! that turns a [`Submission`] into an [`OutboundResponse`]; [`run`] takes
//! care of draining the inbox and answering on each message's own channel.

use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use std::future::Future;
use std::sync::Arc;

use crate::dispatch::dispatcher::Inbox;
use crate::dispatch::message::{OutboundResponse, Submission};

/// Drain `inbox`, answering every message with `handler`.
///
/// Each message is handled on its own task, so a slow submission does not
/// hold up the ones behind it and replies may complete out of order.
/// Returns once every [`Dispatcher`](crate::dispatch::Dispatcher) handle is
/// gone and the queue is empty.
pub async fn run<F, Fut>(mut inbox: Inbox, handler: F)
where
    F: Fn(Submission) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OutboundResponse> + Send + 'static,
{
    let handler = Arc::new(handler);
    tracing::info!("Processor started");

    while let Some(message) = inbox.recv().await {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let (submission, reply) = message.into_parts();
            let identity = submission.identity;
            let response = (*handler)(submission).await;
            if reply.send(response).is_err() {
                tracing::debug!(%identity, "Requester left before the reply was ready");
            }
        });
    }

    tracing::info!("Processor queue closed");
}

/// Built-in handler that answers with the submitted payload.
///
/// Lets the gateway run without a signing backend, e.g. to check which bytes
/// a client's JSON canonicalizes to.
pub async fn echo(submission: Submission) -> OutboundResponse {
    tracing::info!(
        identity = %submission.identity,
        already_hashed = submission.already_hashed,
        size = submission.payload.len(),
        "Message received"
    );
    let content_type = HeaderValue::from_static(submission.content_type());
    OutboundResponse::new(StatusCode::OK, submission.payload).with_header(CONTENT_TYPE, content_type)
}
