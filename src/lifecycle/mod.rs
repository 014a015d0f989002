//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build auth table → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! Server state (state.rs):
//!     Created → Serving → ShuttingDown → Stopped
//! ```
//!
//! # Design Decisions
//! - Fail fast: bind and config errors abort startup
//! - Shutdown has a deadline: dispatches still waiting after the grace
//!   period are abandoned

pub mod shutdown;
pub mod signals;
pub mod state;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use state::{ServerState, StateHandle};
