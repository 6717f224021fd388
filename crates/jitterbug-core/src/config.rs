//! Declarative backoff configuration.
//!
//! [`BackoffConfig`] is the serializable form of the strategy options, for
//! loading from config files or the environment. Durations are signed
//! millisecond counts so that a negative value in a file is reported as a
//! [`ConfigError::NegativeDuration`] instead of an opaque parse failure.

use crate::error::{ConfigError, Result};
use crate::retry::ExponentialStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable for [`BackoffConfig::base_ms`].
pub const ENV_BASE_MS: &str = "JITTERBUG_BASE_MS";
/// Environment variable for [`BackoffConfig::max_ms`].
pub const ENV_MAX_MS: &str = "JITTERBUG_MAX_MS";
/// Environment variable for [`BackoffConfig::jitter`].
pub const ENV_JITTER: &str = "JITTERBUG_JITTER";

/// Serializable exponential backoff options.
///
/// # Examples
///
/// ```rust
/// use jitterbug_core::config::BackoffConfig;
/// use std::time::Duration;
///
/// let config: BackoffConfig = serde_json::from_str(r#"{"base_ms": 25, "max_ms": 5000}"#).unwrap();
/// let strategy = config.build().unwrap();
/// assert_eq!(strategy.base(), Duration::from_millis(25));
/// assert_eq!(strategy.jitter(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackoffConfig {
    /// Smallest nonzero delay, in milliseconds
    pub base_ms: i64,

    /// Ceiling on any computed delay, in milliseconds
    pub max_ms: i64,

    /// Fraction of the nominal delay subject to downward randomization
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_ms: 10,
            max_ms: 1000,
            jitter: 1.0,
        }
    }
}

impl BackoffConfig {
    /// Configuration that yields the zero-delay strategy.
    pub fn none() -> Self {
        Self {
            base_ms: 0,
            max_ms: 0,
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `JITTERBUG_BASE_MS` for the base interval (milliseconds)
    /// - `JITTERBUG_MAX_MS` for the ceiling (milliseconds)
    /// - `JITTERBUG_JITTER` for the jitter fraction
    ///
    /// Unset variables keep their defaults. Set but unparsable variables are
    /// an error; range checks happen in [`build`](Self::build).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(base_ms) = env_var(ENV_BASE_MS)? {
            config.base_ms = base_ms;
        }
        if let Some(max_ms) = env_var(ENV_MAX_MS)? {
            config.max_ms = max_ms;
        }
        if let Some(jitter) = env_var(ENV_JITTER)? {
            config.jitter = jitter;
        }

        Ok(config)
    }

    /// Validate the options and build a strategy seeded from entropy.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NegativeDuration`] if either duration is negative
    /// - [`ConfigError::BaseExceedsMax`] if `base_ms > max_ms`
    /// - [`ConfigError::JitterOutOfRange`] if jitter is outside `[0, 1]`
    pub fn build(&self) -> Result<ExponentialStrategy> {
        ExponentialStrategy::builder()
            .base(non_negative_millis("base_ms", self.base_ms)?)
            .max(non_negative_millis("max_ms", self.max_ms)?)
            .jitter(self.jitter)
            .build()
    }
}

impl TryFrom<&BackoffConfig> for ExponentialStrategy {
    type Error = ConfigError;

    fn try_from(config: &BackoffConfig) -> Result<Self> {
        config.build()
    }
}

impl TryFrom<BackoffConfig> for ExponentialStrategy {
    type Error = ConfigError;

    fn try_from(config: BackoffConfig) -> Result<Self> {
        config.build()
    }
}

impl From<&ExponentialStrategy> for BackoffConfig {
    fn from(strategy: &ExponentialStrategy) -> Self {
        Self {
            base_ms: saturating_millis(strategy.base()),
            max_ms: saturating_millis(strategy.max()),
            jitter: strategy.jitter(),
        }
    }
}

fn non_negative_millis(field: &'static str, value_ms: i64) -> Result<Duration> {
    u64::try_from(value_ms)
        .map(Duration::from_millis)
        .map_err(|_| {
            let err = ConfigError::NegativeDuration { field, value_ms };
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %err, "rejected backoff configuration");
            err
        })
}

fn saturating_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

fn env_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(_) => Ok(None),
    }
}
