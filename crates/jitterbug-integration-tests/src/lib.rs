//! Integration tests and utilities for the jitterbug workspace
//!
//! The engine in `jitterbug-core` only computes delays. This crate provides
//! the other half of the contract, a caller-side retry loop, so the two can
//! be exercised together under a real (or paused) tokio clock.

use jitterbug_core::retry::{Backoff, BackoffStrategy};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Why [`retry_with_backoff`] gave up.
#[derive(Debug, Error, PartialEq)]
pub enum RetryError<E> {
    /// The operation failed with an error the predicate rejected.
    #[error("non-retryable failure on attempt {attempts}: {error}")]
    Permanent {
        /// Attempts made, including the failing one
        attempts: u32,
        /// The operation's error
        error: E,
    },

    /// Every allowed attempt failed.
    #[error("gave up after {attempts} attempts: {error}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// The last error seen
        error: E,
    },
}

impl<E> RetryError<E> {
    /// Number of times the operation was invoked.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Permanent { attempts, .. } | RetryError::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Outcome of a successful [`retry_with_backoff`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    /// The operation's result
    pub value: T,
    /// Number of times the operation was invoked
    pub attempts: u32,
    /// Sum of the delays waited between attempts
    pub waited: Duration,
}

/// Run `operation` until it succeeds, fails permanently, or `max_attempts`
/// invocations have been made.
///
/// One backoff instance is created for the whole call. The attempt index
/// passed to it is the number of failures so far minus one, i.e. `0` before
/// the first retry.
pub async fn retry_with_backoff<S, F, Fut, T, E, P>(
    strategy: &S,
    max_attempts: u32,
    is_retryable: P,
    mut operation: F,
) -> Result<Retried<T>, RetryError<E>>
where
    S: BackoffStrategy + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut backoff = strategy.new_backoff();
    let mut attempt = 0u32;
    let mut waited = Duration::ZERO;

    loop {
        match operation().await {
            Ok(value) => {
                return Ok(Retried {
                    value,
                    attempts: attempt + 1,
                    waited,
                });
            }
            Err(err) if !is_retryable(&err) => {
                tracing::debug!(attempt, error = %err, "not retrying");
                return Err(RetryError::Permanent {
                    attempts: attempt + 1,
                    error: err,
                });
            }
            Err(err) if attempt + 1 >= max_attempts => {
                tracing::warn!(attempts = attempt + 1, error = %err, "retries exhausted");
                return Err(RetryError::Exhausted {
                    attempts: attempt + 1,
                    error: err,
                });
            }
            Err(err) => {
                let delay = backoff.duration(attempt);
                tracing::info!(attempt, ?delay, error = %err, "retrying after backoff");
                tokio::time::sleep(delay).await;
                waited += delay;
                attempt += 1;
            }
        }
    }
}
