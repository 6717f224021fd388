//! The two-method surface shared by every backoff strategy.

use std::time::Duration;

/// Immutable configuration that manufactures per-operation backoff timers.
///
/// A strategy is obtained once (per process or per client) and shared freely
/// between threads. Callers ask it for a fresh [`Backoff`] at the start of
/// each logical operation, not once per attempt.
///
/// # Design Philosophy
///
/// Call sites are polymorphic over this one trait. Disabling backoff is done
/// by handing them a strategy whose parameters collapse every delay to zero
/// (see [`NONE`](super::NONE)), never by branching on a flag.
///
/// # Examples
///
/// ```rust
/// use jitterbug_core::retry::{BackoffStrategy, ExponentialStrategy};
/// use std::time::Duration;
///
/// fn first_delay(strategy: &dyn BackoffStrategy) -> Duration {
///     let mut backoff = strategy.new_backoff();
///     backoff.duration(0)
/// }
///
/// let strategy = ExponentialStrategy::builder()
///     .base(Duration::from_millis(10))
///     .max(Duration::from_secs(1))
///     .jitter(0.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(first_delay(&strategy), Duration::from_millis(10));
/// assert_eq!(first_delay(&jitterbug_core::retry::NONE), Duration::ZERO);
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Create an independent backoff instance for one logical operation.
    ///
    /// Each call allocates a new random source; no state is shared between
    /// the instances returned.
    fn new_backoff(&self) -> Box<dyn Backoff + Send>;
}

/// Per-operation delay calculator.
///
/// The instance keeps no history. The caller tracks the attempt index and
/// passes it in on every call, so the result depends only on that index and
/// one random draw. The draw advances a private generator, hence `&mut self`:
/// sharing an instance across threads takes external synchronization.
pub trait Backoff {
    /// Delay to wait before the next try, given how many attempts have
    /// already been made (0-indexed).
    ///
    /// Never fails and never exceeds the strategy's ceiling.
    fn duration(&mut self, attempt: u32) -> Duration;
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn duration(&mut self, attempt: u32) -> Duration {
        (**self).duration(attempt)
    }
}

impl<S: BackoffStrategy + ?Sized> BackoffStrategy for std::sync::Arc<S> {
    fn new_backoff(&self) -> Box<dyn Backoff + Send> {
        (**self).new_backoff()
    }
}
