//! Example: Driving a retry loop with a backoff strategy
//!
//! This example demonstrates:
//! 1. A caller-owned retry loop with exponential backoff
//! 2. Swapping in the zero-delay `NONE` strategy without touching the loop
//! 3. Jitter impact (run multiple times to see variance)
//!
//! Run with:
//! ```bash
//! cargo run -p jitterbug-core --example retry_example
//! ```

use jitterbug_core::prelude::*;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// A simulated API that fails the first few times
struct UnreliableApi {
    attempts: Arc<AtomicU32>,
    fail_count: u32,
}

impl UnreliableApi {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_count,
        }
    }

    async fn call(&self) -> Result<String, std::io::Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.fail_count {
            println!(
                "  Attempt {}: FAILED (simulating transient error)",
                attempt + 1
            );
            Err(std::io::Error::other(format!(
                "Transient error on attempt {}",
                attempt + 1
            )))
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// The caller's side of the contract: one backoff per operation, attempt
/// index tracked here, sleeping done here.
async fn call_with_retries(
    strategy: &dyn BackoffStrategy,
    api: &UnreliableApi,
    max_attempts: u32,
) -> Result<String, std::io::Error> {
    let mut backoff = strategy.new_backoff();
    let mut attempt = 0;

    loop {
        match api.call().await {
            Ok(result) => return Ok(result),
            Err(err) if attempt + 1 >= max_attempts => return Err(err),
            Err(_) => {
                let delay = backoff.duration(attempt);
                println!("  Waiting {:?} before retry...", delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Example 1: Exponential backoff without jitter
async fn example_exponential() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Exponential Backoff ===\n");

    let strategy = ExponentialStrategy::builder()
        .base(Duration::from_millis(100))
        .max(Duration::from_secs(5))
        .jitter(0.0) // No jitter for predictable output
        .build()?;
    println!("Strategy: {}", strategy);

    let api = UnreliableApi::new(2);
    let start = Instant::now();
    let result = call_with_retries(&strategy, &api, 4).await?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: 100ms + 200ms = ~300ms");

    Ok(())
}

/// Example 2: Same loop, zero delays
async fn example_none() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: NONE Strategy ===\n");

    let api = UnreliableApi::new(3);
    let start = Instant::now();
    let result = call_with_retries(&NONE, &api, 4).await?;

    println!("\nResult: {}", result);
    println!("Total time: {:?} (no sleeping)", start.elapsed());

    Ok(())
}

/// Example 3: Jitter spreads delays below the nominal value
fn example_jitter() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Jitter Impact ===\n");

    let strategy = ExponentialStrategy::builder()
        .base(Duration::from_millis(100))
        .max(Duration::from_secs(10))
        .jitter(0.5)
        .build()?;

    println!("Nominal delay for attempt 3 is 800ms; with 50% jitter it lands in [400ms, 800ms]:");
    for caller in 1..=5 {
        let mut backoff = strategy.new_backoff();
        println!("  Caller {}: {:?}", caller, backoff.duration(3));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    example_exponential().await?;
    example_none().await?;
    example_jitter()?;

    println!("\n=== All examples completed ===");
    Ok(())
}
