//! Retry policies for connection supervisors.
//!
//! - [`RetryPolicy`]: parameters for the backoff schedule between
//!   connect/listen attempts (initial steps, regular step, optional limit,
//!   jitter and truncation fractions).
//! - [`RetrySchedule`]: the single-pass iterator of jittered delays a
//!   supervisor consumes while in a retry phase.
//!
//! Defaults are scope-aware: see [`RetryPolicy::for_scope`].

mod retry;

pub use retry::{RetryPolicy, RetrySchedule};
