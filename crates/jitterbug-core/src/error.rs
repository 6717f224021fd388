//! Configuration errors.
//!
//! Misconfiguration is the only failure this crate reports. It surfaces
//! synchronously when a strategy is built; once an
//! [`ExponentialStrategy`](crate::retry::ExponentialStrategy) exists it is
//! valid for good, and computing a delay never fails.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for strategy construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Reasons a backoff strategy can be rejected at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A duration option was negative.
    #[error("{field} must not be negative, got {value_ms}ms")]
    NegativeDuration {
        /// Name of the offending option
        field: &'static str,
        /// The rejected value in milliseconds
        value_ms: i64,
    },

    /// The base interval is larger than the ceiling.
    #[error("base backoff {base:?} exceeds max backoff {max:?}")]
    BaseExceedsMax {
        /// Configured base interval
        base: Duration,
        /// Configured ceiling
        max: Duration,
    },

    /// The jitter fraction was outside `[0, 1]` (or NaN).
    #[error("jitter fraction must be within [0, 1], got {0}")]
    JitterOutOfRange(f64),

    /// An environment variable held a value that could not be parsed.
    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value as read from the environment
        value: String,
    },
}
