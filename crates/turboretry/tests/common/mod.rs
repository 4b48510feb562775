//! Shared fixtures for retry integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;
use turboretry::retry::{AsyncSleeper, Sleeper};

/// Error taxonomy of a typical provider adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("rate limited")]
    RateLimited,
    #[error("connection dropped: {0}")]
    ConnectionDropped(String),
    #[error("upstream returned {0}")]
    Upstream(u16),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("malformed request: {0}")]
    BadRequest(String),
}

/// Discriminator used to register retryable kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    RateLimited,
    Connection,
    Upstream,
    Unauthorized,
    BadRequest,
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::RateLimited => ApiErrorKind::RateLimited,
            Self::ConnectionDropped(_) => ApiErrorKind::Connection,
            Self::Upstream(_) => ApiErrorKind::Upstream,
            Self::Unauthorized => ApiErrorKind::Unauthorized,
            Self::BadRequest(_) => ApiErrorKind::BadRequest,
        }
    }
}

pub const TRANSIENT: [ApiErrorKind; 3] = [
    ApiErrorKind::RateLimited,
    ApiErrorKind::Connection,
    ApiErrorKind::Upstream,
];

/// Records every requested wait instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

#[async_trait]
impl AsyncSleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// An operation that fails with the scripted errors, then succeeds.
#[derive(Debug)]
pub struct FlakyOperation {
    calls: AtomicU32,
    failures: Vec<ApiError>,
}

impl FlakyOperation {
    pub fn new(failures: Vec<ApiError>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures,
        }
    }

    /// Fails with `error` on every call.
    pub fn always(error: ApiError) -> Self {
        Self::new(vec![error; 64])
    }

    pub fn call(&self) -> Result<&'static str, ApiError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        match self.failures.get(n) {
            Some(err) => Err(err.clone()),
            None => Ok("ok"),
        }
    }

    pub async fn call_async(&self) -> Result<&'static str, ApiError> {
        tokio::task::yield_now().await;
        self.call()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}
