//! Request/reply correlation with the processor.
//!
//! # Responsibilities
//! - Enqueue each validated submission with a fresh reply channel
//! - Wait for the reply on that channel only
//! - Bound the wait by the reply timeout and by the shutdown grace period
//!
//! # Design Decisions
//! - Bounded queue: producers wait when the processor falls behind
//! - A reply can never reach the wrong request because every message owns
//!   its channel; the processor may answer in any order
//! - Dropping the receiver on timeout or abandonment is how the request
//!   detaches; a late `ReplySender::send` simply fails

use axum::body::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::dispatch::message::{reply_channel, InboundMessage, OutboundResponse};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Receiving end of the processor queue.
pub type Inbox = mpsc::Receiver<InboundMessage>;

/// Why a dispatch produced no response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("processor queue is closed")]
    QueueClosed,

    #[error("processor dropped the reply channel without answering")]
    ReplyDropped,

    #[error("no reply from processor within {0:?}")]
    TimedOut(Duration),

    #[error("request abandoned during shutdown")]
    Abandoned,
}

impl DispatchError {
    /// Label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            DispatchError::QueueClosed => "queue_closed",
            DispatchError::ReplyDropped => "reply_dropped",
            DispatchError::TimedOut(_) => "timed_out",
            DispatchError::Abandoned => "abandoned",
        }
    }
}

/// Producer handle for the processor queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    queue: mpsc::Sender<InboundMessage>,
    reply_timeout: Option<Duration>,
    shutdown: ShutdownSignal,
    grace: Duration,
    in_flight: Arc<AtomicU64>,
}

impl Dispatcher {
    /// Create a dispatcher and the inbox the processor reads from.
    pub fn new(
        capacity: usize,
        reply_timeout: Option<Duration>,
        shutdown: ShutdownSignal,
        grace: Duration,
    ) -> (Self, Inbox) {
        let (queue, inbox) = mpsc::channel(capacity);
        let dispatcher = Self {
            queue,
            reply_timeout,
            shutdown,
            grace,
            in_flight: Arc::new(AtomicU64::new(0)),
        };
        (dispatcher, inbox)
    }

    pub fn from_config(config: &GatewayConfig, shutdown: ShutdownSignal) -> (Self, Inbox) {
        Self::new(
            config.dispatch.queue_capacity,
            config.dispatch.reply_timeout(),
            shutdown,
            config.lifecycle.shutdown_grace(),
        )
    }

    /// Number of dispatches currently waiting for a reply.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Hand a submission to the processor and wait for its reply.
    pub async fn dispatch(
        &self,
        identity: Uuid,
        payload: Bytes,
        already_hashed: bool,
    ) -> Result<OutboundResponse, DispatchError> {
        let _guard = InFlightGuard::new(Arc::clone(&self.in_flight));
        let (reply, rx) = reply_channel();
        let message = InboundMessage {
            identity,
            payload,
            already_hashed,
            reply,
        };

        let exchange = async {
            if self.queue.send(message).await.is_err() {
                return Err(DispatchError::QueueClosed);
            }
            tracing::debug!(%identity, "Message enqueued, waiting for reply");
            rx.await.map_err(|_| DispatchError::ReplyDropped)
        };

        let bounded = async {
            match self.reply_timeout {
                Some(limit) => match tokio::time::timeout(limit, exchange).await {
                    Ok(result) => result,
                    Err(_) => Err(DispatchError::TimedOut(limit)),
                },
                None => exchange.await,
            }
        };

        let mut shutdown = self.shutdown.clone();
        let grace = self.grace;
        let abandoned = async move {
            shutdown.recv().await;
            tokio::time::sleep(grace).await;
        };

        let result = tokio::select! {
            result = bounded => result,
            () = abandoned => Err(DispatchError::Abandoned),
        };

        match &result {
            Ok(_) => metrics::record_dispatch("replied"),
            Err(e) => {
                tracing::warn!(%identity, error = %e, "Dispatch failed");
                metrics::record_dispatch(e.outcome());
            }
        }
        result
    }
}

/// Counts a dispatch as in flight for as long as it is held.
struct InFlightGuard {
    count: Arc<AtomicU64>,
}

impl InFlightGuard {
    fn new(count: Arc<AtomicU64>) -> Self {
        let now = count.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_in_flight(now);
        Self { count }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let now = self.count.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::record_in_flight(now);
    }
}
