//! Retry policy: attempt budget, backoff parameters and error classification.

use crate::error::{PolicyError, Result};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 6;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_MULTIPLIER: f64 = 2.0;
const DEFAULT_JITTER: f64 = 0.1;

/// Source tag attached to retry events when the caller sets none.
const DEFAULT_SOURCE: &str = module_path!();

type Classifier<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Immutable retry parameters for one kind of operation.
///
/// A policy decides which errors are worth another attempt and how long to
/// wait before each one. The delay before retry `n` (0-indexed) is
/// `initial_delay * multiplier^n` plus a non-negative jitter of at most
/// `jitter` times that amount, and the jittered value is capped at
/// `max_delay` when one is set.
///
/// Policies are cheap to clone and safe to share between threads; every
/// invocation keeps its own [`AttemptState`](super::AttemptState).
///
/// # Examples
///
/// ```rust
/// use turboretry::retry::RetryPolicy;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), turboretry::error::PolicyError> {
/// // Defaults: 6 attempts, 1s initial delay, 60s ceiling, x2 backoff, 10% jitter
/// let policy: RetryPolicy<std::io::Error> = RetryPolicy::builder().build()?;
/// assert_eq!(policy.max_attempts(), 6);
///
/// let policy: RetryPolicy<std::io::Error> = RetryPolicy::builder()
///     .max_attempts(3)
///     .initial_delay(Duration::from_millis(250))
///     .max_delay(Duration::from_secs(5))
///     .multiplier(3.0)
///     .jitter(0.2)
///     .source("billing::client")
///     .build()?;
/// assert_eq!(policy.max_delay(), Some(Duration::from_secs(5)));
/// # Ok(())
/// # }
/// ```
pub struct RetryPolicy<E> {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Option<Duration>,
    multiplier: f64,
    jitter: f64,
    source: Arc<str>,
    retry_on: Classifier<E>,
}

impl<E> RetryPolicy<E> {
    /// Create a new builder with the default parameters.
    pub fn builder() -> RetryPolicyBuilder<E> {
        RetryPolicyBuilder::default()
    }

    /// Maximum number of invocations, including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Base delay before the first retry.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Ceiling applied to each jittered wait, if any.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Factor the base delay grows by after every retried failure.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Upper bound of the additive jitter, as a fraction of the base delay.
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Logical source tag recorded on retry and give-up events.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `error` belongs to the retryable set.
    pub fn is_retryable(&self, error: &E) -> bool {
        (self.retry_on)(error)
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            max_attempts: self.max_attempts,
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
            multiplier: self.multiplier,
            jitter: self.jitter,
            source: Arc::clone(&self.source),
            retry_on: Arc::clone(&self.retry_on),
        }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("multiplier", &self.multiplier)
            .field("jitter", &self.jitter)
            .field("source", &self.source)
            .field("retry_on", &"<classifier>")
            .finish()
    }
}

/// Builder for configuring a [`RetryPolicy`].
///
/// Unset parameters keep their defaults. By default every error is
/// considered retryable; narrow that with [`retry_on`](Self::retry_on) or
/// [`retry_on_kinds`](Self::retry_on_kinds).
pub struct RetryPolicyBuilder<E> {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Option<Duration>,
    multiplier: f64,
    jitter: f64,
    source: Option<String>,
    retry_on: Classifier<E>,
}

impl<E> Default for RetryPolicyBuilder<E> {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: Some(DEFAULT_MAX_DELAY),
            multiplier: DEFAULT_MULTIPLIER,
            jitter: DEFAULT_JITTER,
            source: None,
            retry_on: Arc::new(|_: &E| true),
        }
    }
}

impl<E> fmt::Debug for RetryPolicyBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicyBuilder")
            .field("max_attempts", &self.max_attempts)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("multiplier", &self.multiplier)
            .field("jitter", &self.jitter)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl<E> RetryPolicyBuilder<E> {
    /// Set the attempt budget, counting the first invocation.
    ///
    /// With `1` the operation runs once and any failure is returned
    /// immediately.
    ///
    /// Default: 6
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the base delay before the first retry.
    ///
    /// Default: 1s
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set or remove the ceiling on each wait.
    ///
    /// The ceiling caps the jittered wait only. The base delay keeps
    /// compounding past it, so once saturated every wait equals the ceiling.
    ///
    /// Default: 60s
    ///
    /// # Examples
    ///
    /// ```rust
    /// use turboretry::retry::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let capped = RetryPolicy::<std::io::Error>::builder()
    ///     .max_delay(Duration::from_secs(10));
    /// let unbounded = RetryPolicy::<std::io::Error>::builder()
    ///     .max_delay(None);
    /// ```
    pub fn max_delay(mut self, delay: impl Into<Option<Duration>>) -> Self {
        self.max_delay = delay.into();
        self
    }

    /// Set the backoff multiplier applied after every retried failure.
    ///
    /// Default: 2.0
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the jitter fraction, in `[0, 1)`.
    ///
    /// A jitter of 0.1 adds between 0% and 10% of the base delay to each
    /// wait. Jitter never shortens a wait.
    ///
    /// Default: 0.1
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the source tag recorded on retry events.
    ///
    /// Default: this module's path
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Retry only errors for which `predicate` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use turboretry::retry::RetryPolicy;
    ///
    /// # fn example() -> Result<(), turboretry::error::PolicyError> {
    /// let policy = RetryPolicy::builder()
    ///     .retry_on(|err: &std::io::Error| err.to_string().contains("reset"))
    ///     .build()?;
    ///
    /// assert!(policy.is_retryable(&std::io::Error::other("connection reset")));
    /// assert!(!policy.is_retryable(&std::io::Error::other("bad credentials")));
    /// # Ok(())
    /// # }
    /// ```
    pub fn retry_on<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_on = Arc::new(predicate);
        self
    }

    /// Retry only errors whose discriminator is in `kinds`.
    ///
    /// `kind_of` maps an error to its discriminator, for example an enum
    /// variant tag or [`std::io::Error::kind`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use turboretry::retry::RetryPolicy;
    /// use std::io::{Error, ErrorKind};
    ///
    /// # fn example() -> Result<(), turboretry::error::PolicyError> {
    /// let policy = RetryPolicy::builder()
    ///     .retry_on_kinds([ErrorKind::TimedOut, ErrorKind::ConnectionReset], Error::kind)
    ///     .build()?;
    ///
    /// assert!(policy.is_retryable(&Error::from(ErrorKind::TimedOut)));
    /// assert!(!policy.is_retryable(&Error::from(ErrorKind::PermissionDenied)));
    /// # Ok(())
    /// # }
    /// ```
    pub fn retry_on_kinds<K, I, D>(self, kinds: I, kind_of: D) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Eq + Hash + Send + Sync + 'static,
        D: Fn(&E) -> K + Send + Sync + 'static,
    {
        let kinds: HashSet<K> = kinds.into_iter().collect();
        self.retry_on(move |err| kinds.contains(&kind_of(err)))
    }

    /// Treat every error as retryable (the default).
    pub fn retry_on_any(mut self) -> Self {
        self.retry_on = Arc::new(|_: &E| true);
        self
    }

    /// Validate the parameters and build the policy.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::ZeroAttempts`] if `max_attempts` is 0
    /// - [`PolicyError::InvalidMultiplier`] if the multiplier is not finite
    ///   and positive
    /// - [`PolicyError::InvalidJitter`] if jitter is outside `[0, 1)`
    pub fn build(self) -> Result<RetryPolicy<E>> {
        if self.max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(PolicyError::InvalidMultiplier(self.multiplier));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(PolicyError::InvalidJitter(self.jitter));
        }

        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
            multiplier: self.multiplier,
            jitter: self.jitter,
            source: self.source.as_deref().unwrap_or(DEFAULT_SOURCE).into(),
            retry_on: self.retry_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        RateLimited,
        Unavailable,
        Unauthorized,
    }

    #[test]
    fn test_builder_defaults() {
        let policy = RetryPolicy::<io::Error>::builder().build().unwrap();

        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.initial_delay(), Duration::from_secs(1));
        assert_eq!(policy.max_delay(), Some(Duration::from_secs(60)));
        assert_eq!(policy.multiplier(), 2.0);
        assert_eq!(policy.jitter(), 0.1);
        assert_eq!(policy.source(), "turboretry::retry::policy");
        assert!(policy.is_retryable(&io::Error::other("anything")));
    }

    #[test]
    fn test_builder_custom_values() {
        let policy = RetryPolicy::<io::Error>::builder()
            .max_attempts(3)
            .initial_delay(Duration::from_millis(200))
            .max_delay(None)
            .multiplier(1.5)
            .jitter(0.25)
            .source("gateway")
            .build()
            .unwrap();

        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.initial_delay(), Duration::from_millis(200));
        assert_eq!(policy.max_delay(), None);
        assert_eq!(policy.multiplier(), 1.5);
        assert_eq!(policy.jitter(), 0.25);
        assert_eq!(policy.source(), "gateway");
    }

    #[test]
    fn test_build_rejects_invalid_parameters() {
        let zero = RetryPolicy::<io::Error>::builder().max_attempts(0).build();
        assert_eq!(zero.unwrap_err(), PolicyError::ZeroAttempts);

        for multiplier in [0.0, -1.0, f64::INFINITY] {
            let err = RetryPolicy::<io::Error>::builder()
                .multiplier(multiplier)
                .build()
                .unwrap_err();
            assert!(matches!(err, PolicyError::InvalidMultiplier(_)));
        }

        for jitter in [-0.1, 1.0, 2.0, f64::NAN] {
            let err = RetryPolicy::<io::Error>::builder()
                .jitter(jitter)
                .build()
                .unwrap_err();
            assert!(matches!(err, PolicyError::InvalidJitter(_)));
        }
    }

    #[test]
    fn test_multiplier_below_one_is_allowed() {
        let policy = RetryPolicy::<io::Error>::builder()
            .multiplier(0.5)
            .build()
            .unwrap();
        assert_eq!(policy.multiplier(), 0.5);
    }

    #[test]
    fn test_retry_on_kinds() {
        let policy = RetryPolicy::<Kind>::builder()
            .retry_on_kinds([Kind::RateLimited, Kind::Unavailable], |k: &Kind| *k)
            .build()
            .unwrap();

        assert!(policy.is_retryable(&Kind::RateLimited));
        assert!(policy.is_retryable(&Kind::Unavailable));
        assert!(!policy.is_retryable(&Kind::Unauthorized));
    }

    #[test]
    fn test_retry_on_any_resets_classifier() {
        let policy = RetryPolicy::<Kind>::builder()
            .retry_on(|_| false)
            .retry_on_any()
            .build()
            .unwrap();

        assert!(policy.is_retryable(&Kind::Unauthorized));
    }

    #[test]
    fn test_clone_shares_classifier() {
        let policy = RetryPolicy::<io::Error>::builder()
            .retry_on_kinds([io::ErrorKind::TimedOut], io::Error::kind)
            .build()
            .unwrap();
        let cloned = policy.clone();

        assert!(cloned.is_retryable(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(!cloned.is_retryable(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[test]
    fn test_debug_hides_classifier() {
        let policy = RetryPolicy::<io::Error>::builder().build().unwrap();
        let debug = format!("{:?}", policy);

        assert!(debug.contains("max_attempts: 6"));
        assert!(debug.contains("<classifier>"));
    }
}
