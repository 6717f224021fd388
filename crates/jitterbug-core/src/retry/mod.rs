//! Backoff strategies and per-operation backoff instances.
//!
//! This module computes how long to wait before retrying. It does not retry,
//! decide whether to retry, or sleep: those belong to the caller's loop.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - Immutable factory for per-operation timers
//! - [`Backoff`] - Per-operation delay calculator
//! - [`ExponentialStrategy`] - Exponential backoff with downward jitter
//! - [`NONE`] - Ready-made strategy that always yields zero
//!
//! # Examples
//!
//! ```rust
//! use jitterbug_core::retry::ExponentialStrategy;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let strategy = ExponentialStrategy::new(Duration::from_millis(10), Duration::from_secs(1))?;
//!
//! // One backoff per logical operation
//! let mut backoff = strategy.new_backoff();
//! for attempt in 0..3 {
//!     // ... try the operation, and on a retryable failure:
//!     tokio::time::sleep(backoff.duration(attempt)).await;
//! }
//! # Ok(())
//! # }
//! ```

mod exponential;
mod strategy;

pub use exponential::{ExponentialBackoff, ExponentialStrategy, ExponentialStrategyBuilder, NONE};
pub use strategy::{Backoff, BackoffStrategy};
