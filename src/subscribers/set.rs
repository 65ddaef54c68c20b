//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Trace`](crate::events::Trace) to
//! multiple subscribers **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Trace)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries on per-subscriber queue overflow (traces are dropped for
//!   that subscriber).

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Trace;

use super::Subscribe;

/// Per-subscriber channel with metadata
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Trace>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Trace>>(cap);
            let s = Arc::clone(&sub);

            let handle = tokio::spawn(async move {
                while let Some(trace) = rx.recv().await {
                    let fut = s.on_trace(trace.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        eprintln!(
                            "[connvisor] subscriber '{}' panicked: {:?}",
                            s.name(),
                            panic_err
                        );
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fan-out one trace to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is **full** or **closed**, the trace is
    /// dropped for it and a warning is logged with the subscriber's name.
    pub fn emit(&self, trace: &Trace) {
        let shared = Arc::new(trace.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&shared)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    eprintln!(
                        "[connvisor] subscriber '{}' dropped trace: queue full",
                        channel.name
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    eprintln!(
                        "[connvisor] subscriber '{}' dropped trace: worker closed",
                        channel.name
                    );
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::events::TraceKind;

    struct Recorder {
        seen: Mutex<Vec<TraceKind>>,
        notify: tokio::sync::mpsc::UnboundedSender<()>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_trace(&self, trace: &Trace) {
            self.seen.lock().unwrap().push(trace.kind);
            let _ = self.notify.send(());
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let (tx, mut done) = tokio::sync::mpsc::unbounded_channel();
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
            notify: tx,
        });
        let set = SubscriberSet::new(vec![recorder.clone()]);
        assert_eq!(set.len(), 1);

        set.emit(&Trace::new(TraceKind::ServiceUp));
        done.recv().await.unwrap();
        assert_eq!(&*recorder.seen.lock().unwrap(), &[TraceKind::ServiceUp]);

        set.shutdown().await;
    }
}
