//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom trace observers
//! (logging, metrics, alerting) into a supervisor. Each subscriber is driven
//! by a dedicated worker loop fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they do **not** block the
//!   driver nor other subscribers.
//! - Each subscriber **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, traces for that
//!   subscriber are **dropped** (warn).

use async_trait::async_trait;

use crate::events::Trace;

/// Contract for trace subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative
/// waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single trace for this subscriber.
    async fn on_trace(&self, trace: &Trace);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    ///
    /// On overflow, traces for this subscriber are **dropped** (warn).
    fn queue_capacity(&self) -> usize {
        256
    }
}
