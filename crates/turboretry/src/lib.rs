#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry orchestration for operations that fail transiently.
//!
//! This crate wraps an arbitrary operation (a closure over whatever arguments
//! the caller already bound), re-invokes it when it fails with a retryable
//! error, waits between attempts using exponential backoff with additive
//! jitter, and gives up after a bounded number of attempts by returning the
//! last error unchanged.
//!
//! - **One policy type** via [`RetryPolicy`](retry::RetryPolicy)
//!   - Attempt budget, initial delay, optional ceiling, multiplier, jitter
//!   - Caller-supplied classification of retryable errors
//! - **Two execution modes** sharing one backoff core
//!   - Blocking: [`RetryPolicy::retry`](retry::RetryPolicy::retry)
//!   - Async: [`RetryPolicy::retry_async`](retry::RetryPolicy::retry_async)
//! - **Decorator-style wrapping** via [`Retrying`](retry::Retrying)
//! - **Serde-friendly configuration** via [`RetryConfig`](config::RetryConfig)
//!
//! Retry and give-up events are emitted through `tracing`; installing a
//! subscriber is left to the application.
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use turboretry::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(3)
//!     .initial_delay(Duration::from_millis(100))
//!     .retry_on(|err: &std::io::Error| err.kind() == std::io::ErrorKind::TimedOut)
//!     .build()?;
//!
//! let value = policy
//!     .retry_async("fetch_answer", || async { Ok::<_, std::io::Error>(42) })
//!     .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use turboretry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RetryConfig;
    pub use crate::error::{ConfigError, PolicyError};
    pub use crate::retry::{
        AsyncSleeper, AttemptState, Decision, RetryPolicy, RetryPolicyBuilder, Retrying, Sleeper,
        ThreadSleeper, TokioSleeper,
    };
}
