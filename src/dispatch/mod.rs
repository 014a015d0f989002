//! Dispatch subsystem: the boundary to the external processor.
//!
//! # Data Flow
//! ```text
//! http handler (validated identity + payload)
//!     → dispatcher.rs (new reply channel, enqueue InboundMessage)
//!     → processor queue (bounded mpsc, many producers, one consumer)
//!     → processor.rs / embedding application (produce OutboundResponse)
//!     → reply channel (oneshot, exactly one response)
//!     → dispatcher.rs → http handler → client
//! ```

pub mod dispatcher;
pub mod message;
pub mod processor;

pub use dispatcher::{DispatchError, Dispatcher, Inbox};
pub use message::{
    InboundMessage, OutboundResponse, ReplySender, Submission, HASH_CONTENT_TYPE,
    JSON_CONTENT_TYPE,
};
