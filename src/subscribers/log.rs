//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints traces to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [connect-requested] attempt=1
//! [service-not-up] reason="connection refused"
//! [backoff] delay=2000ms attempt=1
//! [service-up] peer=#3
//! [service-down] peer=#3
//! [close-requested] peer=#3
//! [completed] outcome=aborted
//! ```

use async_trait::async_trait;

use crate::events::{Trace, TraceKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable trace
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_trace(&self, t: &Trace) {
        match t.kind {
            TraceKind::ConnectRequested => {
                println!("[connect-requested] attempt={:?}", t.attempt);
            }
            TraceKind::ListenRequested => {
                println!("[listen-requested] attempt={:?}", t.attempt);
            }
            TraceKind::Listening => {
                println!("[listening] listener={:?}", t.peer);
            }
            TraceKind::ServiceUp => {
                println!("[service-up] peer={:?}", t.peer);
            }
            TraceKind::ServiceDown => {
                println!("[service-down] peer={:?}", t.peer);
            }
            TraceKind::ServiceNotUp => {
                println!("[service-not-up] reason={:?}", t.reason);
            }
            TraceKind::BackoffScheduled => {
                println!(
                    "[backoff] delay={:?}ms attempt={:?}",
                    t.delay_ms, t.attempt
                );
            }
            TraceKind::RetryExhausted => {
                println!("[retry-exhausted] attempt={:?}", t.attempt);
            }
            TraceKind::CloseRequested => {
                println!("[close-requested] peer={:?}", t.peer);
            }
            TraceKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
            TraceKind::Completed => {
                println!("[completed] outcome={:?}", t.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
