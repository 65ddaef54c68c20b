//! Error types used by the connvisor runtime.
//!
//! The crate keeps runtime failures out of the error channel entirely:
//! connection loss, retry exhaustion and shutdown are encoded as events and
//! completion values (see [`Outcome`](crate::events::Outcome)), never raised
//! out of handlers. What remains is construction-time validation.

use thiserror::Error;

/// # Errors produced while building supervisors and policies.
///
/// These represent invalid configuration supplied by the caller, such as an
/// empty host or a retry fraction outside `[0, 1]`. They are reported once,
/// at construction, and never occur while a supervisor is running.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Endpoint host was empty.
    #[error("endpoint host must not be empty")]
    EmptyHost,

    /// Endpoint port was zero (valid ports are 1..=65535).
    #[error("endpoint port must be in 1..=65535")]
    ZeroPort,

    /// A retry step (initial or regular) was not a positive duration.
    #[error("retry steps must be positive, got {seconds}s")]
    NonPositiveStep {
        /// The offending step value in seconds.
        seconds: f64,
    },

    /// Jitter or truncation fraction was outside `[0, 1]`.
    #[error("{name} fraction must be within [0, 1], got {value}")]
    FractionOutOfRange {
        /// Which fraction was invalid (`"jitter"` or `"truncation"`).
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Step-count limit was zero (use `None` for unlimited).
    #[error("retry step limit must be positive; use None for unlimited")]
    ZeroLimit,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use connvisor::ConfigError;
    ///
    /// assert_eq!(ConfigError::EmptyHost.as_label(), "config_empty_host");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::EmptyHost => "config_empty_host",
            ConfigError::ZeroPort => "config_zero_port",
            ConfigError::NonPositiveStep { .. } => "config_non_positive_step",
            ConfigError::FractionOutOfRange { .. } => "config_fraction_out_of_range",
            ConfigError::ZeroLimit => "config_zero_limit",
        }
    }
}
