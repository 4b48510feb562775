//! Wait primitives for the two execution modes.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Blocking wait between attempts.
///
/// The default [`ThreadSleeper`] parks the calling thread. Tests and callers
/// with their own clock can substitute an implementation that records or
/// skips the wait.
pub trait Sleeper: Send + Sync {
    /// Block the current thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Non-blocking wait between attempts.
///
/// Implementations must yield to the scheduler instead of blocking the
/// thread. The returned future is dropped if the surrounding task is
/// cancelled, which ends the retry loop without another attempt.
#[async_trait]
pub trait AsyncSleeper: Send + Sync {
    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// [`AsyncSleeper`] backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl AsyncSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

#[async_trait]
impl<S: AsyncSleeper + ?Sized> AsyncSleeper for Arc<S> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}
