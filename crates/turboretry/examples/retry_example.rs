//! Example: retrying a flaky API in both execution modes
//!
//! This example demonstrates:
//! 1. Async retry with exponential backoff
//! 2. Retrying only transient error kinds
//! 3. Blocking retry through a wrapped operation
//!
//! Run with:
//! ```bash
//! cargo run -p turboretry --example retry_example
//! ```

use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use turboretry::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Failure {
    RateLimited,
    Unauthorized,
}

#[derive(Debug, thiserror::Error)]
#[error("{kind:?} on attempt {attempt}")]
struct ApiError {
    kind: Failure,
    attempt: u32,
}

/// A simulated API that fails the first few times
struct UnreliableApi {
    attempts: AtomicU32,
    fail_count: u32,
    failure: Failure,
}

impl UnreliableApi {
    fn new(fail_count: u32, failure: Failure) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            fail_count,
            failure,
        }
    }

    fn call(&self) -> Result<String, ApiError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if attempt <= self.fail_count {
            println!("  Attempt {}: FAILED ({:?})", attempt, self.failure);
            Err(ApiError {
                kind: self.failure,
                attempt,
            })
        } else {
            println!("  Attempt {}: SUCCESS", attempt);
            Ok("API response data".to_string())
        }
    }

    async fn call_async(&self) -> Result<String, ApiError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.call()
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn transient_policy() -> Result<RetryPolicy<ApiError>, PolicyError> {
    RetryPolicy::builder()
        .max_attempts(4)
        .initial_delay(Duration::from_millis(100))
        .max_delay(Duration::from_secs(1))
        .multiplier(2.0)
        .jitter(0.1)
        .retry_on_kinds([Failure::RateLimited], |err: &ApiError| err.kind)
        .source("examples::unreliable_api")
        .build()
}

/// Example 1: async retry with exponential backoff
async fn example_async_retry() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Async Retry with Exponential Backoff ===\n");

    let policy = transient_policy()?;
    let api = UnreliableApi::new(2, Failure::RateLimited);

    let start = Instant::now();
    let result = policy.retry_async("fetch_data", || api.call_async()).await?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected waits: 100-110ms + 200-220ms");

    Ok(())
}

/// Example 2: non-transient errors are returned on the first failure
async fn example_fatal_error() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Fatal Errors Are Not Retried ===\n");

    let policy = transient_policy()?;
    let api = UnreliableApi::new(5, Failure::Unauthorized);

    match policy.retry_async("fetch_data", || api.call_async()).await {
        Ok(_) => println!("Unexpected success"),
        Err(err) => println!("\nGave up immediately: {}", err),
    }
    println!("Total attempts: {}", api.total_attempts());

    Ok(())
}

/// Example 3: blocking retry through a wrapped operation
fn example_blocking_wrap() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Blocking Retry via wrap() ===\n");

    let policy = RetryConfig {
        tries: 3,
        delay: 0.05,
        ..Default::default()
    }
    .into_builder()?
    .retry_on_kinds([Failure::RateLimited], |err: &ApiError| err.kind)
    .build()?;

    let api = UnreliableApi::new(5, Failure::RateLimited);
    let mut fetch = policy.wrap("fetch_data_blocking", || api.call());

    match fetch.call() {
        Ok(_) => println!("Unexpected success"),
        Err(err) => println!("\n{} gave up with the last error: {}", fetch.name(), err),
    }
    println!("Total attempts: {}", api.total_attempts());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("==============================================");
    println!("   TurboRetry: Retry Executor Examples");
    println!("==============================================");

    example_async_retry().await?;
    example_fatal_error().await?;
    tokio::task::spawn_blocking(|| example_blocking_wrap().map_err(|e| e.to_string())).await??;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
