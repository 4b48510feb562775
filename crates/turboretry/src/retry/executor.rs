//! Blocking and async retry loops.

use super::policy::RetryPolicy;
use super::sleep::{AsyncSleeper, Sleeper, ThreadSleeper, TokioSleeper};
use super::state::{AttemptState, Decision};
use std::fmt::{self, Display};
use std::future::Future;

impl<E: Display> RetryPolicy<E> {
    /// Run a blocking operation under this policy.
    ///
    /// The operation is invoked until it returns `Ok`, fails with an error
    /// the policy does not retry, or has failed `max_attempts` times. In the
    /// last two cases the operation's own error is returned unchanged.
    /// Waits block the calling thread.
    ///
    /// `operation` names the call in retry and give-up events.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use turboretry::retry::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let policy = RetryPolicy::builder()
    ///     .max_attempts(3)
    ///     .initial_delay(Duration::from_millis(1))
    ///     .build()?;
    ///
    /// let mut calls = 0;
    /// let value = policy.retry("count_up", || {
    ///     calls += 1;
    ///     if calls < 3 {
    ///         Err(std::io::Error::other("not yet"))
    ///     } else {
    ///         Ok(calls)
    ///     }
    /// })?;
    /// assert_eq!(value, 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn retry<T, F>(&self, operation: &str, f: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.retry_with(operation, &ThreadSleeper, f)
    }

    /// Run a blocking operation, waiting with `sleeper`.
    pub fn retry_with<T, F, S>(&self, operation: &str, sleeper: &S, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        S: Sleeper + ?Sized,
    {
        let mut state = AttemptState::new(self);
        loop {
            let err = match f() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            match state.on_failure(self, operation, &err) {
                Decision::Retry(delay) => sleeper.sleep(delay),
                Decision::GiveUp | Decision::Propagate => return Err(err),
            }
        }
    }

    /// Run an async operation under this policy.
    ///
    /// Same contract as [`retry`](Self::retry), except the operation is
    /// awaited and waits suspend the task through [`tokio::time::sleep`].
    /// Dropping the returned future cancels the loop at once, whether it is
    /// awaiting the operation or waiting between attempts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use turboretry::retry::RetryPolicy;
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicU32, Ordering};
    /// use std::time::Duration;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let policy = RetryPolicy::builder()
    ///     .max_attempts(3)
    ///     .initial_delay(Duration::from_millis(1))
    ///     .build()?;
    ///
    /// let attempts = Arc::new(AtomicU32::new(0));
    /// let value = policy
    ///     .retry_async("fetch", || {
    ///         let attempts = Arc::clone(&attempts);
    ///         async move {
    ///             if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
    ///                 Err(std::io::Error::other("retry me"))
    ///             } else {
    ///                 Ok("ok")
    ///             }
    ///         }
    ///     })
    ///     .await?;
    /// assert_eq!(value, "ok");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn retry_async<T, F, Fut>(&self, operation: &str, f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.retry_async_with(operation, &TokioSleeper, f).await
    }

    /// Run an async operation, waiting with `sleeper`.
    pub async fn retry_async_with<T, F, Fut, S>(
        &self,
        operation: &str,
        sleeper: &S,
        mut f: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        S: AsyncSleeper + ?Sized,
    {
        let mut state = AttemptState::new(self);
        loop {
            let err = match f().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            match state.on_failure(self, operation, &err) {
                Decision::Retry(delay) => {
                    drop(err);
                    sleeper.sleep(delay).await;
                }
                Decision::GiveUp | Decision::Propagate => return Err(err),
            }
        }
    }

    /// Bind an operation to this policy under a name.
    ///
    /// The returned [`Retrying`] is called like the bare operation and yields
    /// the same `Result<T, E>`, with retries applied.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use turboretry::retry::RetryPolicy;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let policy = RetryPolicy::builder().max_attempts(2).build()?;
    /// let mut ping = policy.wrap("ping", || Ok::<_, std::io::Error>("pong"));
    ///
    /// assert_eq!(ping.name(), "ping");
    /// assert_eq!(ping.call()?, "pong");
    /// # Ok(())
    /// # }
    /// ```
    pub fn wrap<F>(&self, name: impl Into<String>, f: F) -> Retrying<E, F> {
        Retrying {
            policy: self.clone(),
            name: name.into(),
            f,
        }
    }
}

/// An operation with a retry policy attached.
///
/// Keeps the operation's name for logging and introspection. Blocking
/// operations are run with [`call`](Self::call), async ones with
/// [`call_async`](Self::call_async).
pub struct Retrying<E, F> {
    policy: RetryPolicy<E>,
    name: String,
    f: F,
}

impl<E, F> Retrying<E, F> {
    /// Name the operation was wrapped under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Policy applied to every call.
    pub fn policy(&self) -> &RetryPolicy<E> {
        &self.policy
    }

    /// Unwrap the bare operation.
    pub fn into_inner(self) -> F {
        self.f
    }
}

impl<E, F, T> Retrying<E, F>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    /// Invoke the blocking operation with retries.
    pub fn call(&mut self) -> Result<T, E> {
        self.policy.retry(&self.name, &mut self.f)
    }
}

impl<E, F, Fut, T> Retrying<E, F>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    /// Invoke the async operation with retries.
    pub async fn call_async(&mut self) -> Result<T, E> {
        self.policy.retry_async(&self.name, &mut self.f).await
    }
}

impl<E, F> fmt::Debug for Retrying<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrying")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
