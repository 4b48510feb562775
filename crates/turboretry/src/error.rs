//! Errors raised while building a retry policy.
//!
//! Failures of the retried operation itself are never wrapped: the executor
//! hands the caller the exact error value the operation produced. The types
//! here only cover invalid policy parameters and unreadable configuration.

use thiserror::Error;

/// Result type for policy construction.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// A retry policy parameter is out of range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// The attempt budget must allow at least one invocation.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    /// A delay given in seconds is negative, NaN or infinite.
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDelay {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The backoff multiplier must be finite and strictly positive.
    #[error("backoff multiplier must be finite and greater than 0 (got {0})")]
    InvalidMultiplier(f64),

    /// The jitter fraction must lie in `[0, 1)`.
    #[error("jitter must be in [0, 1) (got {0})")]
    InvalidJitter(f64),
}

/// Configuration could not be turned into a policy.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the expected shape.
    #[error("invalid retry configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but describes an invalid policy.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_error_messages() {
        assert_eq!(
            PolicyError::ZeroAttempts.to_string(),
            "max_attempts must be at least 1"
        );
        assert_eq!(
            PolicyError::InvalidJitter(1.5).to_string(),
            "jitter must be in [0, 1) (got 1.5)"
        );

        let err = PolicyError::InvalidDelay {
            field: "max_delay",
            value: -2.0,
        };
        assert!(err.to_string().starts_with("max_delay must be"));
    }

    #[test]
    fn test_config_error_is_transparent_for_policy() {
        let err: ConfigError = PolicyError::InvalidMultiplier(0.0).into();
        assert_eq!(
            err.to_string(),
            PolicyError::InvalidMultiplier(0.0).to_string()
        );
    }
}
