//! # Observability records emitted by the driver.
//!
//! Every significant supervisor transition publishes a [`Trace`] to the
//! [`Bus`](crate::events::Bus). Traces are for observers (logging, metrics,
//! tests); they are not part of the parent contract and dropping them has no
//! effect on supervision.
//!
//! ## Ordering guarantees
//! Each trace has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when traces are
//! delivered out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::events::event::Handle;

/// Global sequence counter for trace ordering.
static TRACE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    /// A connect request was issued to the transport.
    ///
    /// Sets:
    /// - `attempt`: connect attempt number (1-based)
    ConnectRequested,

    /// A listen request was issued to the transport.
    ///
    /// Sets:
    /// - `attempt`: listen attempt number (1-based)
    ListenRequested,

    /// The listen completed; the endpoint is bound.
    ///
    /// Sets:
    /// - `peer`: the listener handle
    Listening,

    /// The service came up (connect succeeded or a peer was accepted).
    ///
    /// Sets:
    /// - `peer`: the connected/accepted peer
    ServiceUp,

    /// An established connection terminated.
    ///
    /// Sets:
    /// - `peer`: the peer that went away
    /// - `reason`: closure/loss description, when available
    ServiceDown,

    /// A connect/listen attempt failed; a retry is pending.
    ///
    /// Sets:
    /// - `reason`: failure description
    ServiceNotUp,

    /// The next attempt was scheduled.
    ///
    /// Sets:
    /// - `delay_ms`: delay before the next attempt
    /// - `attempt`: attempts made so far
    BackoffScheduled,

    /// The retry schedule is exhausted; the supervisor gives up.
    ///
    /// Sets:
    /// - `attempt`: attempts made before exhaustion
    RetryExhausted,

    /// An orderly close was requested (Stop while a handle was open).
    ///
    /// Sets:
    /// - `peer`: the handle being closed (per peer for listeners)
    CloseRequested,

    /// The close grace period (T2) expired before all closes completed.
    GraceExceeded,

    /// The supervisor completed.
    ///
    /// Sets:
    /// - `reason`: `"aborted"` or `"closed"`
    Completed,
}

/// Supervisor trace with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`TraceKind`]
#[derive(Clone, Debug)]
pub struct Trace {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Trace classification.
    pub kind: TraceKind,
    /// Peer/listener handle, if applicable.
    pub peer: Option<Handle>,
    /// Backoff delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Human-readable reason (errors, closure values, outcomes).
    pub reason: Option<Arc<str>>,
}

impl Trace {
    /// Creates a new trace of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: TraceKind) -> Self {
        Self {
            seq: TRACE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            peer: None,
            delay_ms: None,
            attempt: None,
            reason: None,
        }
    }

    /// Attaches a peer handle.
    #[inline]
    pub fn with_peer(mut self, peer: Handle) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Trace::new(TraceKind::ConnectRequested);
        let b = Trace::new(TraceKind::ServiceUp);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let peer = Handle::next();
        let t = Trace::new(TraceKind::BackoffScheduled)
            .with_peer(peer)
            .with_delay(Duration::from_millis(1500))
            .with_attempt(3)
            .with_reason("refused");
        assert_eq!(t.peer, Some(peer));
        assert_eq!(t.delay_ms, Some(1500));
        assert_eq!(t.attempt, Some(3));
        assert_eq!(t.reason.as_deref(), Some("refused"));
    }
}
