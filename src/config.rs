//! # Supervisor configuration.
//!
//! [`Config`] centralizes the settings shared by client and listener
//! supervisors. It is consumed once at spawn time; everything in it is
//! immutable afterwards.
//!
//! ## Sentinel values
//! - `retry = None` → derive the retry policy from the endpoint's
//!   [`AddressScope`](crate::AddressScope) at construction.

use std::time::Duration;

use crate::policies::RetryPolicy;

/// Settings for one supervisor.
///
/// ## Field semantics
/// - `close_grace`: how long an orderly shutdown waits for outstanding
///   closes (the T2 timer) before completing regardless.
/// - `retry`: explicit retry policy; `None` derives scope defaults from the
///   endpoint host.
/// - `bus_capacity`: trace bus ring buffer size (min 1; clamped by the Bus).
#[derive(Clone, Debug)]
pub struct Config {
    /// Graceful-close timeout (T2). On expiry the supervisor completes
    /// without waiting for outstanding `Closed` acknowledgements.
    pub close_grace: Duration,

    /// Retry policy override. `None` = derive from the endpoint's scope.
    pub retry: Option<RetryPolicy>,

    /// Capacity of the trace bus broadcast ring buffer.
    ///
    /// Slow trace receivers that lag behind more than `bus_capacity`
    /// records will observe `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Resolves the retry policy for an endpoint: the explicit override if
    /// set, otherwise the scope default.
    pub fn retry_for(&self, endpoint: &crate::Endpoint) -> RetryPolicy {
        self.retry
            .clone()
            .unwrap_or_else(|| RetryPolicy::for_scope(endpoint.scope()))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `close_grace = 3s` (bounded orderly shutdown)
    /// - `retry = None` (scope-derived)
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            close_grace: Duration::from_secs(3),
            retry: None,
            bus_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Endpoint;

    #[test]
    fn test_retry_for_derives_scope_default() {
        let cfg = Config::default();
        let ep = Endpoint::new("127.0.0.1", 9000).unwrap();
        assert_eq!(cfg.retry_for(&ep).initial, vec![2.0, 4.0]);

        let ep = Endpoint::new("198.51.100.5", 443).unwrap();
        assert_eq!(cfg.retry_for(&ep).regular, 64.0);
    }

    #[test]
    fn test_explicit_retry_wins() {
        let policy = RetryPolicy::new(vec![1.0], 2.0, Some(5), 0.0, 0.0).unwrap();
        let cfg = Config {
            retry: Some(policy.clone()),
            ..Config::default()
        };
        let ep = Endpoint::new("127.0.0.1", 9000).unwrap();
        assert_eq!(cfg.retry_for(&ep), policy);
    }
}
