//! # Trace bus for broadcasting supervisor observability records.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking [`Trace`] publishing from the driver to any number of
//! observers.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls
//!   `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent traces for all
//!   receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip
//!   `n` oldest items.
//! - **No persistence**: traces are lost if there are no active receivers at
//!   send time. Supervision never depends on trace delivery.

use tokio::sync::broadcast;

use super::trace::Trace;

/// Broadcast channel for supervisor traces.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); multiple
/// publishers can publish concurrently and receivers get clones of each
/// trace.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Trace>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Trace>(capacity.max(1));
        Self { tx }
    }

    /// Publishes a trace to all active receivers.
    ///
    /// If there are no receivers, the trace is dropped.
    pub fn publish(&self, trace: Trace) {
        let _ = self.tx.send(trace);
    }

    /// Creates a new receiver that observes subsequent traces.
    ///
    /// Each call creates an independent receiver; it only gets traces sent
    /// after it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Trace> {
        self.tx.subscribe()
    }
}
