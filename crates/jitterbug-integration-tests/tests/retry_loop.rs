//! End-to-end tests: caller-side retry loop driven by jitterbug strategies.

use jitterbug_core::prelude::*;
use jitterbug_integration_tests::{RetryError, retry_with_backoff};
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fixed(base_ms: u64, max_ms: u64) -> ExponentialStrategy {
    ExponentialStrategy::builder()
        .base(Duration::from_millis(base_ms))
        .max(Duration::from_millis(max_ms))
        .jitter(0.0)
        .build()
        .expect("valid strategy")
}

/// Fails `failures` times with `message`, then succeeds.
fn flaky(
    counter: Arc<AtomicU32>,
    failures: u32,
    message: &'static str,
) -> impl FnMut() -> std::future::Ready<Result<u32, String>> {
    move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        if n < failures {
            std::future::ready(Err(message.to_string()))
        } else {
            std::future::ready(Ok(n))
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_success_after_retries_waits_exponentially() {
    init_tracing();
    let strategy = fixed(10, 1000);
    let counter = Arc::new(AtomicU32::new(0));

    let start = Instant::now();
    let result = retry_with_backoff(
        &strategy,
        5,
        |_| true,
        flaky(Arc::clone(&counter), 3, "transient"),
    )
    .await
    .expect("should eventually succeed");

    assert_eq!(result.attempts, 4);
    assert_eq!(result.value, 3);
    // 10ms + 20ms + 40ms
    assert_eq!(result.waited, Duration::from_millis(70));
    assert!(start.elapsed() >= Duration::from_millis(70));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_reports_last_error() {
    init_tracing();
    let strategy = fixed(100, 250);
    let counter = Arc::new(AtomicU32::new(0));

    let err = retry_with_backoff(
        &strategy,
        4,
        |_| true,
        flaky(Arc::clone(&counter), u32::MAX, "down"),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        RetryError::Exhausted {
            attempts: 4,
            error: "down".to_string(),
        }
    );
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_error_stops_immediately() {
    init_tracing();
    let strategy = fixed(10, 1000);
    let counter = Arc::new(AtomicU32::new(0));

    let err = retry_with_backoff(
        &strategy,
        5,
        |e: &String| e.contains("network"),
        flaky(Arc::clone(&counter), u32::MAX, "auth failed"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RetryError::Permanent { attempts: 1, .. }));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_none_strategy_never_sleeps() {
    init_tracing();
    let counter = Arc::new(AtomicU32::new(0));

    let start = std::time::Instant::now();
    let result = retry_with_backoff(
        &NONE,
        50,
        |_| true,
        flaky(Arc::clone(&counter), 40, "busy"),
    )
    .await
    .expect("should eventually succeed");

    assert_eq!(result.attempts, 41);
    assert_eq!(result.waited, Duration::ZERO);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[rstest]
#[case(0.0)]
#[case(0.5)]
#[case(1.0)]
#[tokio::test(start_paused = true)]
async fn test_total_wait_bounded_by_nominal_budget(#[case] jitter: f64) {
    let strategy = ExponentialStrategy::builder()
        .base(Duration::from_millis(50))
        .max(Duration::from_millis(300))
        .jitter(jitter)
        .build()
        .expect("valid strategy");
    let counter = Arc::new(AtomicU32::new(0));

    let start = Instant::now();
    let err = retry_with_backoff(
        &strategy,
        6,
        |_| true,
        flaky(Arc::clone(&counter), u32::MAX, "down"),
    )
    .await
    .unwrap_err();
    let elapsed = start.elapsed();
    assert_eq!(err.attempts(), 6);

    // nominal: 50 + 100 + 200 + 300 + 300
    let budget = Duration::from_millis(950);
    let floor = budget.mul_f64(1.0 - jitter);

    // timers fire on millisecond ticks, so allow one tick per sleep
    assert!(elapsed <= budget + Duration::from_millis(5), "{:?}", elapsed);
    assert!(elapsed >= floor, "{:?} < {:?}", elapsed, floor);
}

#[tokio::test(start_paused = true)]
async fn test_dyn_strategy_call_sites() {
    let strategies: Vec<Arc<dyn BackoffStrategy>> = vec![
        Arc::new(fixed(10, 1000)),
        Arc::new(BackoffConfig::none().build().expect("valid config")),
    ];

    let mut waited = Vec::new();
    for strategy in &strategies {
        let counter = Arc::new(AtomicU32::new(0));
        let result = retry_with_backoff(
            strategy.as_ref(),
            3,
            |_| true,
            flaky(counter, 2, "retry me"),
        )
        .await
        .expect("should eventually succeed");
        waited.push(result.waited);
    }

    assert_eq!(waited, vec![Duration::from_millis(30), Duration::ZERO]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_operations_get_independent_jitter() {
    init_tracing();
    let strategy = Arc::new(
        ExponentialStrategy::builder()
            .base(Duration::from_secs(1))
            .max(Duration::from_secs(1))
            .jitter(1.0)
            .build()
            .expect("valid strategy"),
    );

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let strategy = Arc::clone(&strategy);
            tokio::spawn(async move {
                let mut backoff = strategy.new_backoff();
                (0..16).map(|_| backoff.duration(0)).collect::<Vec<_>>()
            })
        })
        .collect();

    let mut sequences = Vec::new();
    for task in tasks {
        sequences.push(task.await.expect("task panicked"));
    }

    for (i, a) in sequences.iter().enumerate() {
        assert!(a.iter().all(|d| *d <= Duration::from_secs(1)));
        for b in &sequences[i + 1..] {
            assert_ne!(a, b, "two operations drew identical jitter sequences");
        }
    }
}

#[test]
fn test_seeded_factory_makes_runs_replayable() {
    let run = || {
        let strategy = ExponentialStrategy::builder()
            .base(Duration::from_millis(10))
            .max(Duration::from_secs(5))
            .jitter(0.8)
            .rng_factory(SeededRngFactory::new(2024))
            .build()
            .expect("valid strategy");

        (0..3)
            .map(|_| {
                let mut backoff = strategy.new_backoff();
                (0..10).map(|a| backoff.duration(a)).collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };

    let first = run();
    assert_eq!(first, run());
    assert_ne!(first[0], first[1]);
}
