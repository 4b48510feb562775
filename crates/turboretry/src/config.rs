//! Serializable retry configuration.
//!
//! [`RetryConfig`] mirrors [`RetryPolicy`]'s timing parameters as plain
//! numbers (delays in seconds) so they can live in a config file. Error
//! classification cannot be serialized; attach it to the builder returned by
//! [`RetryConfig::into_builder`].

use crate::error::{ConfigError, PolicyError};
use crate::retry::{RetryPolicy, RetryPolicyBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry parameters as they appear in configuration files.
///
/// Every field is optional in the source document and falls back to the
/// same defaults as [`RetryPolicy::builder`]. A `null` `max_delay` removes
/// the ceiling.
///
/// # Examples
///
/// ```rust
/// use turboretry::config::RetryConfig;
/// use turboretry::retry::RetryPolicy;
///
/// # fn example() -> Result<(), turboretry::error::ConfigError> {
/// let config = RetryConfig::from_json_str(r#"{ "tries": 3, "delay": 0.5, "max_delay": null }"#)?;
/// let policy: RetryPolicy<std::io::Error> = config
///     .into_builder()?
///     .retry_on(|err: &std::io::Error| err.kind() == std::io::ErrorKind::TimedOut)
///     .build()?;
///
/// assert_eq!(policy.max_attempts(), 3);
/// assert_eq!(policy.max_delay(), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of invocations, including the first.
    pub tries: u32,

    /// Initial delay in seconds.
    pub delay: f64,

    /// Ceiling on each wait in seconds, or `None` for no ceiling.
    pub max_delay: Option<f64>,

    /// Backoff multiplier.
    pub backoff: f64,

    /// Jitter fraction in `[0, 1)`.
    pub jitter: f64,

    /// Source tag for retry events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            tries: 6,
            delay: 1.0,
            max_delay: Some(60.0),
            backoff: 2.0,
            jitter: 0.1,
            source: None,
        }
    }
}

impl RetryConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert to a builder, validating the delays.
    ///
    /// The builder validates the remaining fields in
    /// [`build`](RetryPolicyBuilder::build).
    pub fn into_builder<E>(self) -> Result<RetryPolicyBuilder<E>, PolicyError> {
        let initial_delay = seconds("delay", self.delay)?;
        let max_delay = self
            .max_delay
            .map(|secs| seconds("max_delay", secs))
            .transpose()?;

        let builder = RetryPolicy::builder()
            .max_attempts(self.tries)
            .initial_delay(initial_delay)
            .max_delay(max_delay)
            .multiplier(self.backoff)
            .jitter(self.jitter);

        Ok(match self.source {
            Some(source) => builder.source(source),
            None => builder,
        })
    }

    /// Build a policy that retries every error.
    pub fn into_policy<E>(self) -> Result<RetryPolicy<E>, PolicyError> {
        self.into_builder()?.build()
    }
}

impl<E> TryFrom<RetryConfig> for RetryPolicy<E> {
    type Error = PolicyError;

    fn try_from(config: RetryConfig) -> Result<Self, Self::Error> {
        config.into_policy()
    }
}

impl<E> From<&RetryPolicy<E>> for RetryConfig {
    fn from(policy: &RetryPolicy<E>) -> Self {
        Self {
            tries: policy.max_attempts(),
            delay: policy.initial_delay().as_secs_f64(),
            max_delay: policy.max_delay().map(|d| d.as_secs_f64()),
            backoff: policy.multiplier(),
            jitter: policy.jitter(),
            source: Some(policy.source().to_string()),
        }
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, PolicyError> {
    Duration::try_from_secs_f64(value).map_err(|_| PolicyError::InvalidDelay { field, value })
}
