//! Random sources for backoff instances.
//!
//! Every [`ExponentialBackoff`](crate::retry::ExponentialBackoff) owns its own
//! generator. A strategy never holds a generator itself, only an
//! [`RngFactory`] that mints a fresh, independently seeded one per instance.
//! Draws therefore need no locking, and jitter sequences of concurrent
//! operations are uncorrelated.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Produces a new random source for each backoff instance.
///
/// Implementations must hand out generators that do not share state with one
/// another. Closures returning a boxed generator implement this trait:
///
/// ```rust
/// use jitterbug_core::retry::ExponentialStrategy;
/// use rand::{rngs::StdRng, RngCore, SeedableRng};
/// use std::time::Duration;
///
/// let strategy = ExponentialStrategy::builder()
///     .max(Duration::from_secs(1))
///     .rng_factory(|| Box::new(StdRng::seed_from_u64(7)) as Box<dyn RngCore + Send>)
///     .build()
///     .unwrap();
/// # let _ = strategy;
/// ```
pub trait RngFactory: Send + Sync {
    /// Create a fresh generator for one backoff instance.
    fn new_rng(&self) -> Box<dyn RngCore + Send>;
}

impl<F> RngFactory for F
where
    F: Fn() -> Box<dyn RngCore + Send> + Send + Sync,
{
    fn new_rng(&self) -> Box<dyn RngCore + Send> {
        self()
    }
}

/// Seeds every generator from operating-system entropy.
///
/// This is what strategies use unless told otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyRngFactory;

impl RngFactory for EntropyRngFactory {
    fn new_rng(&self) -> Box<dyn RngCore + Send> {
        Box::new(StdRng::from_entropy())
    }
}

/// Deterministic factory for tests and reproducible benchmarks.
///
/// The `n`th generator handed out is seeded with `seed + n`, so a run can be
/// replayed exactly while sibling instances still draw different sequences.
#[derive(Debug, Default)]
pub struct SeededRngFactory {
    seed: u64,
    issued: AtomicU64,
}

impl SeededRngFactory {
    /// Create a factory whose first generator is seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            issued: AtomicU64::new(0),
        }
    }

    /// Number of generators handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

impl RngFactory for SeededRngFactory {
    fn new_rng(&self) -> Box<dyn RngCore + Send> {
        let n = self.issued.fetch_add(1, Ordering::Relaxed);
        Box::new(StdRng::seed_from_u64(self.seed.wrapping_add(n)))
    }
}

/// Where a strategy gets its generators from.
///
/// The entropy case is a plain variant so that strategies, including
/// [`NONE`](crate::retry::NONE), can be built in `const` context.
#[derive(Clone, Default)]
pub(crate) enum RandomSource {
    #[default]
    Entropy,
    Custom(Arc<dyn RngFactory>),
}

impl RandomSource {
    pub(crate) fn new_rng(&self) -> Box<dyn RngCore + Send> {
        match self {
            RandomSource::Entropy => EntropyRngFactory.new_rng(),
            RandomSource::Custom(factory) => factory.new_rng(),
        }
    }
}

impl fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomSource::Entropy => f.write_str("Entropy"),
            RandomSource::Custom(_) => f.write_str("Custom"),
        }
    }
}
