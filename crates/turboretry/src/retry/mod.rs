//! Retry policies and the executor that applies them.
//!
//! This module provides one backoff core shared by a blocking and an async
//! execution mode.
//!
//! # Key Types
//!
//! - [`RetryPolicy`] - Immutable retry parameters plus error classification
//! - [`AttemptState`] - Per-invocation backoff state and decisions
//! - [`Sleeper`] / [`AsyncSleeper`] - How each mode waits between attempts
//! - [`Retrying`] - An operation bound to a policy and a name
//!
//! # Examples
//!
//! ```rust
//! use turboretry::retry::RetryPolicy;
//! use std::io;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(3)
//!     .initial_delay(Duration::from_millis(10))
//!     .retry_on_kinds([io::ErrorKind::TimedOut], io::Error::kind)
//!     .build()?;
//!
//! let value = policy.retry("read_sensor", || Ok::<_, io::Error>(7))?;
//! assert_eq!(value, 7);
//! # Ok(())
//! # }
//! ```

mod executor;
mod policy;
mod sleep;
mod state;

pub use executor::Retrying;
pub use policy::{RetryPolicy, RetryPolicyBuilder};
pub use sleep::{AsyncSleeper, Sleeper, ThreadSleeper, TokioSleeper};
pub use state::{AttemptState, Decision, sleep_duration};
