#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry-delay computation for the jitterbug ecosystem.
//!
//! Given an attempt count, this crate produces how long a caller should wait
//! before retrying a failed operation. It never retries, sleeps, or decides
//! whether a failure is retryable; it only computes durations.
//!
//! - **Strategies** via the [`BackoffStrategy`](retry::BackoffStrategy) trait
//!   - Exponential backoff with downward jitter
//!   - A zero-delay [`NONE`](retry::NONE) strategy for tests and benchmarks
//! - **Per-operation random sources** via [`RngFactory`](rng::RngFactory)
//! - **Declarative configuration** via [`BackoffConfig`](config::BackoffConfig)
//!
//! # Design Philosophy
//!
//! - A strategy is immutable and validated once; it is freely shared.
//! - Each logical operation gets its own [`Backoff`](retry::Backoff) with its
//!   own generator, so draws need no locks and concurrent callers do not
//!   retry in lockstep.
//! - Disabling backoff means swapping in a strategy whose parameters collapse
//!   to zero, not branching at call sites.
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use jitterbug_core::prelude::*;
//! use std::time::Duration;
//!
//! let strategy = ExponentialStrategy::builder()
//!     .base(Duration::from_millis(10))
//!     .max(Duration::from_secs(1))
//!     .jitter(0.0)
//!     .build()?;
//!
//! let mut backoff = strategy.new_backoff();
//! assert_eq!(backoff.duration(0), Duration::from_millis(10));
//! assert_eq!(backoff.duration(1), Duration::from_millis(20));
//! assert_eq!(backoff.duration(20), Duration::from_secs(1));
//! # Ok::<(), ConfigError>(())
//! ```

pub mod config;
pub mod error;
pub mod retry;
pub mod rng;

pub use error::{ConfigError, Result};

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use jitterbug_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::BackoffConfig;
    pub use crate::error::ConfigError;
    pub use crate::retry::{
        Backoff, BackoffStrategy, ExponentialBackoff, ExponentialStrategy, NONE,
    };
    pub use crate::rng::{EntropyRngFactory, RngFactory, SeededRngFactory};
}
