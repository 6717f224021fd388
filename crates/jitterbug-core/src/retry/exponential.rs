//! Exponential backoff with downward jitter.

use super::strategy::{Backoff, BackoffStrategy};
use crate::error::{ConfigError, Result};
use crate::rng::{RandomSource, RngFactory};
use rand::{Rng, RngCore};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE: Duration = Duration::from_millis(10);
const DEFAULT_MAX: Duration = Duration::from_secs(1);
const DEFAULT_JITTER: f64 = 1.0;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Strategy that always yields a zero delay.
///
/// Meant for tests that should not sleep and for benchmarks that want maximum
/// offered load. It is an ordinary [`ExponentialStrategy`] with
/// `base = max = 0`, so every computed target is zero.
pub static NONE: ExponentialStrategy = ExponentialStrategy::none();

#[derive(Debug, Clone, Copy, PartialEq)]
struct Params {
    base: Duration,
    max: Duration,
    jitter: f64,
}

impl Params {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::JitterOutOfRange(self.jitter));
        }
        if self.base > self.max {
            return Err(ConfigError::BaseExceedsMax {
                base: self.base,
                max: self.max,
            });
        }
        Ok(())
    }

    /// `min(max, base * 2^attempt)`, decided before shifting so it cannot overflow.
    fn target(&self, attempt: u32) -> Duration {
        let base = self.base.as_nanos();
        let max = self.max.as_nanos();

        if base == 0 {
            return Duration::ZERO;
        }
        if attempt >= u128::BITS || base > max >> attempt {
            return self.max;
        }
        duration_from_nanos(base << attempt)
    }

    /// Shorten `target` by up to `jitter * target`; `u` is a draw from `[0, 1)`.
    fn jittered(&self, target: Duration, u: f64) -> Duration {
        let nanos = target.as_nanos();
        // float-to-int casts saturate, and the factor is within [0, 1]
        let reduction = (nanos as f64 * self.jitter * (1.0 - u)) as u128;
        duration_from_nanos(nanos.saturating_sub(reduction)).min(self.max)
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    // callers only pass values bounded by an existing Duration
    Duration::new(
        (nanos / NANOS_PER_SEC) as u64,
        (nanos % NANOS_PER_SEC) as u32,
    )
}

/// Exponential backoff strategy with downward jitter.
///
/// The nominal delay for attempt `n` is `base * 2^n`, capped at `max`. Jitter
/// only ever shortens it, so `max` bounds every delay strictly, which keeps
/// overall timeout budgets computable.
///
/// # Mathematical Formula
///
/// For attempt `n` (0-indexed) and a uniform draw `u` in `[0, 1)`:
/// ```text
/// target = min(max, base * 2^n)
/// delay  = target * (1 - jitter) + target * jitter * u
/// ```
/// which is uniform over `[target * (1 - jitter), target]`. A zero target
/// returns immediately without drawing.
///
/// # Examples
///
/// ```rust
/// use jitterbug_core::retry::ExponentialStrategy;
/// use std::time::Duration;
///
/// let strategy = ExponentialStrategy::builder()
///     .base(Duration::from_millis(10))
///     .max(Duration::from_secs(1))
///     .jitter(0.0)
///     .build()
///     .unwrap();
///
/// let mut backoff = strategy.new_backoff();
/// assert_eq!(backoff.duration(0), Duration::from_millis(10));
/// assert_eq!(backoff.duration(2), Duration::from_millis(40));
/// assert_eq!(backoff.duration(7), Duration::from_secs(1));
/// ```
///
/// # Performance Characteristics
///
/// - **Memory**: one boxed generator per backoff instance
/// - **CPU**: O(1) per delay - integer arithmetic plus at most one random draw
/// - **I/O**: none; callers do their own sleeping
#[derive(Debug, Clone)]
pub struct ExponentialStrategy {
    params: Params,
    random: RandomSource,
}

impl ExponentialStrategy {
    /// Create a strategy from a base interval and a ceiling, with the
    /// default jitter fraction of `1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BaseExceedsMax`] when `base > max`.
    pub fn new(base: Duration, max: Duration) -> Result<Self> {
        Self::builder().base(base).max(max).build()
    }

    /// Create a new builder for configuring exponential backoff.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitterbug_core::retry::ExponentialStrategy;
    /// use std::time::Duration;
    ///
    /// let strategy = ExponentialStrategy::builder()
    ///     .base(Duration::from_millis(50))
    ///     .max(Duration::from_secs(30))
    ///     .jitter(0.5)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(strategy.jitter(), 0.5);
    /// ```
    pub fn builder() -> ExponentialStrategyBuilder {
        ExponentialStrategyBuilder::default()
    }

    /// The zero-delay strategy, identical to [`NONE`].
    pub const fn none() -> Self {
        Self {
            params: Params {
                base: Duration::ZERO,
                max: Duration::ZERO,
                jitter: DEFAULT_JITTER,
            },
            random: RandomSource::Entropy,
        }
    }

    /// Smallest nonzero delay.
    pub fn base(&self) -> Duration {
        self.params.base
    }

    /// Ceiling on every computed delay.
    pub fn max(&self) -> Duration {
        self.params.max
    }

    /// Fraction of the nominal delay subject to downward randomization.
    pub fn jitter(&self) -> f64 {
        self.params.jitter
    }

    /// Create an independent backoff instance for one logical operation.
    ///
    /// Allocates a fresh random source and touches no shared mutable state,
    /// so it is safe to call from many threads at once.
    pub fn new_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            params: self.params,
            rng: self.random.new_rng(),
        }
    }
}

impl Default for ExponentialStrategy {
    /// Defaults:
    /// - `base`: 10ms
    /// - `max`: 1s
    /// - `jitter`: 1.0 (anywhere between zero and the nominal delay)
    fn default() -> Self {
        Self {
            params: Params {
                base: DEFAULT_BASE,
                max: DEFAULT_MAX,
                jitter: DEFAULT_JITTER,
            },
            random: RandomSource::Entropy,
        }
    }
}

/// Strategies compare by parameters; the random source is not considered.
impl PartialEq for ExponentialStrategy {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
    }
}

impl fmt::Display for ExponentialStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exponential(base={:?}, max={:?}, jitter={})",
            self.params.base, self.params.max, self.params.jitter
        )
    }
}

impl BackoffStrategy for ExponentialStrategy {
    fn new_backoff(&self) -> Box<dyn Backoff + Send> {
        Box::new(ExponentialStrategy::new_backoff(self))
    }
}

/// Per-operation instance produced by [`ExponentialStrategy::new_backoff`].
///
/// Owns its generator exclusively. Not meant to be shared: create one per
/// retry loop and drop it when the operation succeeds or gives up.
pub struct ExponentialBackoff {
    params: Params,
    rng: Box<dyn RngCore + Send>,
}

impl ExponentialBackoff {
    /// Delay before the next try after `attempt` previous attempts.
    ///
    /// Total over all `u32` inputs: large attempts clamp to the ceiling.
    pub fn duration(&mut self, attempt: u32) -> Duration {
        let target = self.params.target(attempt);
        if target.is_zero() {
            return Duration::ZERO;
        }
        if self.params.jitter == 0.0 {
            return target;
        }

        let u: f64 = self.rng.gen_range(0.0..1.0);
        let delay = self.params.jittered(target, u);

        #[cfg(feature = "tracing")]
        tracing::trace!(attempt, ?target, ?delay, "computed backoff");

        delay
    }
}

impl Backoff for ExponentialBackoff {
    fn duration(&mut self, attempt: u32) -> Duration {
        ExponentialBackoff::duration(self, attempt)
    }
}

impl fmt::Debug for ExponentialBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExponentialBackoff")
            .field("base", &self.params.base)
            .field("max", &self.params.max)
            .field("jitter", &self.params.jitter)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring [`ExponentialStrategy`].
///
/// Unlike a plain setter chain, [`build`](Self::build) validates: a returned
/// strategy is valid forever after.
///
/// # Examples
///
/// ```rust
/// use jitterbug_core::retry::ExponentialStrategy;
/// use jitterbug_core::rng::SeededRngFactory;
/// use std::time::Duration;
///
/// let strategy = ExponentialStrategy::builder()
///     .base(Duration::from_millis(100))
///     .max(Duration::from_secs(30))
///     .jitter(0.2)
///     .rng_factory(SeededRngFactory::new(7))
///     .build()
///     .unwrap();
/// # let _ = strategy;
///
/// let err = ExponentialStrategy::builder()
///     .base(Duration::from_secs(2))
///     .max(Duration::from_secs(1))
///     .build();
/// assert!(err.is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct ExponentialStrategyBuilder {
    base: Option<Duration>,
    max: Option<Duration>,
    jitter: Option<f64>,
    random: RandomSource,
}

impl ExponentialStrategyBuilder {
    /// Set the smallest nonzero delay (the delay for attempt 0).
    ///
    /// Default: 10ms
    pub fn base(mut self, base: Duration) -> Self {
        self.base = Some(base);
        self
    }

    /// Set the ceiling on any computed delay.
    ///
    /// Default: 1s
    pub fn max(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }

    /// Set the jitter fraction. Must lie in `[0, 1]`; `0` disables jitter.
    ///
    /// Default: 1.0
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Supply the factory that seeds each backoff instance's generator.
    ///
    /// Default: [`EntropyRngFactory`](crate::rng::EntropyRngFactory)
    pub fn rng_factory(mut self, factory: impl RngFactory + 'static) -> Self {
        self.random = RandomSource::Custom(Arc::new(factory));
        self
    }

    /// Share an already-boxed factory between several strategies.
    pub fn shared_rng_factory(mut self, factory: Arc<dyn RngFactory>) -> Self {
        self.random = RandomSource::Custom(factory);
        self
    }

    /// Validate and build the strategy.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::JitterOutOfRange`] if jitter is outside `[0, 1]` or NaN
    /// - [`ConfigError::BaseExceedsMax`] if `base > max`
    pub fn build(self) -> Result<ExponentialStrategy> {
        let params = Params {
            base: self.base.unwrap_or(DEFAULT_BASE),
            max: self.max.unwrap_or(DEFAULT_MAX),
            jitter: self.jitter.unwrap_or(DEFAULT_JITTER),
        };

        if let Err(err) = params.validate() {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %err, "rejected backoff configuration");
            return Err(err);
        }

        let strategy = ExponentialStrategy {
            params,
            random: self.random,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            base = ?strategy.base(),
            max = ?strategy.max(),
            jitter = strategy.jitter(),
            "built backoff strategy"
        );

        Ok(strategy)
    }
}
