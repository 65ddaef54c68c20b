//! # Retry policy for connection supervisors.
//!
//! [`RetryPolicy`] controls the delays between reconnect/relisten attempts.
//! It is parameterized by:
//! - [`RetryPolicy::initial`] — the opening sequence of nominal delays;
//! - [`RetryPolicy::regular`] — the steady-state nominal delay after the
//!   opening sequence is consumed;
//! - [`RetryPolicy::limit`] — optional cap on the total number of steps;
//! - [`RetryPolicy::jitter`] / [`RetryPolicy::truncation`] — fractions that
//!   bound the random draw around each nominal delay.
//!
//! Each yielded delay is drawn uniformly from
//! `[nominal × (1 − truncation), nominal × (1 + jitter)]`, so the mean stays
//! near the nominal while concurrent supervisors decorrelate.
//!
//! A [`RetrySchedule`] is single-pass: a supervisor constructs a fresh one
//! every time it enters a retry phase and discards it on success. Exhaustion
//! (the limit was reached) means "give up"; the supervisor completes with an
//! aborted outcome.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use connvisor::{AddressScope, RetryPolicy};
//!
//! let policy = RetryPolicy::for_scope(AddressScope::Loopback);
//! let mut schedule = policy.schedule();
//!
//! // First step is centred on the first initial step (2s for loopback):
//! let d = schedule.next().unwrap();
//! assert!(d >= Duration::from_secs_f64(2.0 * 0.5));
//! assert!(d <= Duration::from_secs_f64(2.0 * 1.25));
//! ```

use std::time::Duration;

use rand::Rng;

use crate::endpoint::AddressScope;
use crate::error::ConfigError;

/// Backoff parameters for reconnect/relisten attempts.
///
/// Immutable value; one instance per supervisor. Construct explicitly with
/// [`RetryPolicy::new`] or derive scope-tuned defaults with
/// [`RetryPolicy::for_scope`].
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Nominal delays (seconds) for the opening attempts, in order.
    pub initial: Vec<f64>,
    /// Nominal delay (seconds) for every attempt after the opening sequence.
    pub regular: f64,
    /// Optional cap on total steps; `None` retries forever.
    pub limit: Option<u32>,
    /// Upper jitter fraction: a draw may exceed the nominal by this fraction.
    pub jitter: f64,
    /// Lower truncation fraction: a draw may undercut the nominal by this fraction.
    pub truncation: f64,
}

impl RetryPolicy {
    /// Default jitter fraction shared by all scope defaults.
    pub const DEFAULT_JITTER: f64 = 0.25;
    /// Default truncation fraction shared by all scope defaults.
    pub const DEFAULT_TRUNCATION: f64 = 0.5;

    /// Creates a validated policy.
    ///
    /// Fails if any step is non-positive, a fraction falls outside `[0, 1]`,
    /// or the limit is `Some(0)`.
    pub fn new(
        initial: Vec<f64>,
        regular: f64,
        limit: Option<u32>,
        jitter: f64,
        truncation: f64,
    ) -> Result<Self, ConfigError> {
        for &step in initial.iter().chain(std::iter::once(&regular)) {
            if !(step > 0.0) || !step.is_finite() {
                return Err(ConfigError::NonPositiveStep { seconds: step });
            }
        }
        for (name, value) in [("jitter", jitter), ("truncation", truncation)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FractionOutOfRange { name, value });
            }
        }
        if limit == Some(0) {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(Self {
            initial,
            regular,
            limit,
            jitter,
            truncation,
        })
    }

    /// Returns the default policy for an address scope.
    ///
    /// Nearby endpoints retry quickly; distant ones back off further:
    /// - `Loopback`: initial `[2, 4]`, regular `8`
    /// - `Private`: initial `[4, 8]`, regular `16`
    /// - `Public` / `Other`: initial `[8, 16, 32]`, regular `64`
    ///
    /// All use jitter `0.25`, truncation `0.5`, and no step limit.
    pub fn for_scope(scope: AddressScope) -> Self {
        let (initial, regular) = match scope {
            AddressScope::Loopback => (vec![2.0, 4.0], 8.0),
            AddressScope::Private => (vec![4.0, 8.0], 16.0),
            AddressScope::Public | AddressScope::Other => (vec![8.0, 16.0, 32.0], 64.0),
        };
        Self {
            initial,
            regular,
            limit: None,
            jitter: Self::DEFAULT_JITTER,
            truncation: Self::DEFAULT_TRUNCATION,
        }
    }

    /// Starts a fresh single-pass schedule over this policy.
    pub fn schedule(&self) -> RetrySchedule {
        RetrySchedule {
            policy: self.clone(),
            step: 0,
        }
    }

    /// The nominal (un-jittered) delay for the 0-indexed step.
    fn nominal(&self, step: u32) -> f64 {
        self.initial
            .get(step as usize)
            .copied()
            .unwrap_or(self.regular)
    }
}

/// Single-pass iterator of jittered retry delays.
///
/// Yields one delay per attempt: the opening steps first, then the regular
/// step forever (or until the policy's limit is reached). Each delay is a
/// uniform draw within the policy's jitter/truncation bounds around the
/// nominal.
///
/// Regenerate via [`RetryPolicy::schedule`] on every entry into a retry
/// phase; never rewind or share one.
#[derive(Clone, Debug)]
pub struct RetrySchedule {
    policy: RetryPolicy,
    step: u32,
}

impl RetrySchedule {
    /// Number of delays already yielded.
    #[inline]
    pub fn taken(&self) -> u32 {
        self.step
    }
}

impl Iterator for RetrySchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if let Some(limit) = self.policy.limit {
            if self.step >= limit {
                return None;
            }
        }
        let nominal = self.policy.nominal(self.step);
        self.step += 1;

        let lo = nominal * (1.0 - self.policy.truncation);
        let hi = nominal * (1.0 + self.policy.jitter);
        let secs = if hi > lo {
            rand::rng().random_range(lo..=hi)
        } else {
            nominal
        };
        Some(Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(initial: Vec<f64>, regular: f64, limit: Option<u32>) -> RetryPolicy {
        // jitter=0, truncation=0 makes draws deterministic for sequencing tests
        RetryPolicy::new(initial, regular, limit, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_initial_then_regular() {
        let mut s = exact(vec![2.0, 4.0], 8.0, None).schedule();
        assert_eq!(s.next(), Some(Duration::from_secs_f64(2.0)));
        assert_eq!(s.next(), Some(Duration::from_secs_f64(4.0)));
        for _ in 0..10 {
            assert_eq!(s.next(), Some(Duration::from_secs_f64(8.0)));
        }
    }

    #[test]
    fn test_limit_exhausts_iterator() {
        let mut s = exact(vec![1.0, 2.0], 3.0, Some(3)).schedule();
        assert!(s.next().is_some());
        assert!(s.next().is_some());
        assert!(s.next().is_some());
        assert_eq!(s.next(), None);
        assert_eq!(s.next(), None, "exhausted schedule stays exhausted");
    }

    #[test]
    fn test_limit_within_initial_steps() {
        let mut s = exact(vec![1.0, 2.0, 3.0], 4.0, Some(2)).schedule();
        assert_eq!(s.next(), Some(Duration::from_secs_f64(1.0)));
        assert_eq!(s.next(), Some(Duration::from_secs_f64(2.0)));
        assert_eq!(s.next(), None);
    }

    #[test]
    fn test_draws_within_bounds() {
        let policy = RetryPolicy::new(vec![8.0], 64.0, None, 0.25, 0.5).unwrap();
        for _ in 0..200 {
            let mut s = policy.schedule();
            let first = s.next().unwrap();
            assert!(first >= Duration::from_secs_f64(8.0 * 0.5), "{first:?}");
            assert!(first <= Duration::from_secs_f64(8.0 * 1.25), "{first:?}");
            let second = s.next().unwrap();
            assert!(second >= Duration::from_secs_f64(64.0 * 0.5), "{second:?}");
            assert!(second <= Duration::from_secs_f64(64.0 * 1.25), "{second:?}");
        }
    }

    #[test]
    fn test_fresh_schedule_restarts_from_first_step() {
        let policy = exact(vec![2.0, 4.0], 8.0, None);
        let mut s = policy.schedule();
        s.next();
        s.next();
        s.next();
        assert_eq!(s.taken(), 3);

        let mut fresh = policy.schedule();
        assert_eq!(fresh.next(), Some(Duration::from_secs_f64(2.0)));
    }

    #[test]
    fn test_scope_defaults() {
        let loopback = RetryPolicy::for_scope(AddressScope::Loopback);
        assert_eq!(loopback.initial, vec![2.0, 4.0]);
        assert_eq!(loopback.regular, 8.0);

        let private = RetryPolicy::for_scope(AddressScope::Private);
        assert_eq!(private.initial, vec![4.0, 8.0]);
        assert_eq!(private.regular, 16.0);

        for scope in [AddressScope::Public, AddressScope::Other] {
            let p = RetryPolicy::for_scope(scope);
            assert_eq!(p.initial, vec![8.0, 16.0, 32.0]);
            assert_eq!(p.regular, 64.0);
            assert_eq!(p.limit, None);
            assert_eq!(p.jitter, 0.25);
            assert_eq!(p.truncation, 0.5);
        }
    }

    #[test]
    fn test_validation_rejects_bad_parameters() {
        assert!(matches!(
            RetryPolicy::new(vec![0.0], 1.0, None, 0.0, 0.0),
            Err(ConfigError::NonPositiveStep { .. })
        ));
        assert!(matches!(
            RetryPolicy::new(vec![1.0], -2.0, None, 0.0, 0.0),
            Err(ConfigError::NonPositiveStep { .. })
        ));
        assert!(matches!(
            RetryPolicy::new(vec![1.0], 1.0, None, 1.5, 0.0),
            Err(ConfigError::FractionOutOfRange { name: "jitter", .. })
        ));
        assert!(matches!(
            RetryPolicy::new(vec![1.0], 1.0, None, 0.0, -0.1),
            Err(ConfigError::FractionOutOfRange {
                name: "truncation",
                ..
            })
        ));
        assert_eq!(
            RetryPolicy::new(vec![1.0], 1.0, Some(0), 0.0, 0.0),
            Err(ConfigError::ZeroLimit)
        );
    }

    #[test]
    fn test_empty_initial_uses_regular_immediately() {
        let mut s = exact(vec![], 5.0, None).schedule();
        assert_eq!(s.next(), Some(Duration::from_secs_f64(5.0)));
    }
}
