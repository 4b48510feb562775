//! Backoff state for a single invocation.
//!
//! Both execution modes drive the same [`AttemptState`]; they only differ in
//! how they call the operation and how they wait for the returned delay.

use super::policy::RetryPolicy;
use std::fmt::Display;
use std::time::Duration;

/// What the executor should do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Wait this long, then invoke the operation again.
    Retry(Duration),
    /// The error was retryable but the attempt budget is spent.
    GiveUp,
    /// The error is not retryable; return it without consuming an attempt.
    Propagate,
}

/// Mutable retry bookkeeping for one invocation of an operation.
///
/// Created fresh for every call and never shared, so the executor needs no
/// locking even when one policy serves many threads or tasks.
///
/// The base delay is tracked in seconds as `f64` and grows by the policy's
/// multiplier after every retried failure, without bound. Only the value
/// actually slept is capped by `max_delay`.
///
/// # Examples
///
/// ```rust
/// use turboretry::retry::{AttemptState, Decision, RetryPolicy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), turboretry::error::PolicyError> {
/// let policy = RetryPolicy::builder()
///     .max_attempts(2)
///     .initial_delay(Duration::from_secs(1))
///     .jitter(0.0)
///     .build()?;
///
/// let mut state = AttemptState::new(&policy);
/// let err = std::io::Error::other("timeout");
///
/// assert_eq!(
///     state.on_failure(&policy, "probe", &err),
///     Decision::Retry(Duration::from_secs(1))
/// );
/// assert_eq!(state.on_failure(&policy, "probe", &err), Decision::GiveUp);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptState {
    max_attempts: u32,
    attempts_remaining: u32,
    current_delay: f64,
}

impl AttemptState {
    /// Start tracking a new invocation under `policy`.
    pub fn new<E>(policy: &RetryPolicy<E>) -> Self {
        Self {
            max_attempts: policy.max_attempts(),
            attempts_remaining: policy.max_attempts(),
            current_delay: policy.initial_delay().as_secs_f64(),
        }
    }

    /// Attempts left in the budget, including the one about to run.
    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    /// Retryable failures recorded so far.
    pub fn attempts_made(&self) -> u32 {
        self.max_attempts - self.attempts_remaining
    }

    /// Base delay for the next retry, before jitter and the ceiling.
    ///
    /// Saturates at [`Duration::MAX`] once the compounded delay no longer
    /// fits in a `Duration`.
    pub fn current_delay(&self) -> Duration {
        secs_to_duration(self.current_delay)
    }

    /// Record a failed attempt and decide what happens next.
    ///
    /// Non-retryable errors leave the state untouched. Retryable ones consume
    /// an attempt; if that spends the budget an `ERROR` event is emitted and
    /// [`Decision::GiveUp`] returned. Otherwise the jittered wait is computed,
    /// a `WARN` event is emitted, and the base delay is multiplied for the
    /// following attempt.
    pub fn on_failure<E: Display>(
        &mut self,
        policy: &RetryPolicy<E>,
        operation: &str,
        error: &E,
    ) -> Decision {
        if !policy.is_retryable(error) {
            return Decision::Propagate;
        }

        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        if self.attempts_remaining == 0 {
            tracing::error!(
                operation,
                source = policy.source(),
                attempts = self.max_attempts,
                error = %error,
                "operation failed after exhausting retries"
            );
            return Decision::GiveUp;
        }

        let delay = sleep_duration(
            self.current_delay,
            policy.jitter(),
            policy.max_delay(),
            rand::random::<f64>(),
        );

        tracing::warn!(
            operation,
            source = policy.source(),
            attempt = self.attempts_made(),
            max_attempts = self.max_attempts,
            delay_secs = delay.as_secs_f64(),
            error = %error,
            "operation failed; retrying"
        );

        self.current_delay *= policy.multiplier();
        Decision::Retry(delay)
    }
}

/// Compute one wait from a base delay in seconds.
///
/// `unit` is a sample from `[0, 1)`. The result is
/// `base + base * jitter * unit`, capped at `max_delay` when set. The cap
/// applies to the jittered total.
///
/// # Examples
///
/// ```rust
/// use turboretry::retry::sleep_duration;
/// use std::time::Duration;
///
/// assert_eq!(sleep_duration(2.0, 0.5, None, 0.5), Duration::from_millis(2500));
/// assert_eq!(
///     sleep_duration(120.0, 0.1, Some(Duration::from_secs(60)), 0.0),
///     Duration::from_secs(60)
/// );
/// ```
pub fn sleep_duration(
    base_secs: f64,
    jitter: f64,
    max_delay: Option<Duration>,
    unit: f64,
) -> Duration {
    let jittered = base_secs + base_secs * jitter * unit;
    let capped = match max_delay {
        Some(max) => jittered.min(max.as_secs_f64()),
        None => jittered,
    };
    secs_to_duration(capped)
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
