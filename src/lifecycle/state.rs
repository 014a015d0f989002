//! Server lifecycle state machine.
//!
//! # States
//! ```text
//! Created → Serving → ShuttingDown → Stopped
//! ```
//!
//! Transitions only move forward; an attempt to go back is ignored. A bind
//! failure may jump straight from Created to Stopped.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServerState {
    Created,
    Serving,
    ShuttingDown,
    Stopped,
}

/// Shared, observable server state.
#[derive(Debug, Clone)]
pub struct StateHandle {
    tx: Arc<watch::Sender<ServerState>>,
}

impl StateHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ServerState::Created);
        Self { tx: Arc::new(tx) }
    }

    /// Move to `next` if it lies ahead of the current state.
    ///
    /// Returns whether the state changed.
    pub fn advance(&self, next: ServerState) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        });
        if changed {
            tracing::info!(state = ?next, "Server state changed");
        }
        changed
    }

    pub fn current(&self) -> ServerState {
        *self.tx.borrow()
    }

    /// Receiver that observes every transition.
    pub fn watch(&self) -> watch::Receiver<ServerState> {
        self.tx.subscribe()
    }
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_forward_only() {
        let state = StateHandle::new();
        assert_eq!(state.current(), ServerState::Created);

        assert!(state.advance(ServerState::Serving));
        assert!(state.advance(ServerState::ShuttingDown));
        assert!(!state.advance(ServerState::Serving));
        assert_eq!(state.current(), ServerState::ShuttingDown);

        assert!(state.advance(ServerState::Stopped));
        assert!(!state.advance(ServerState::Stopped));
    }

    #[test]
    fn watchers_observe_transitions() {
        let state = StateHandle::new();
        let mut rx = state.watch();
        state.advance(ServerState::Serving);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ServerState::Serving);
    }
}
