//! Clock abstraction for the wait between call rounds.

use std::time::Duration;

use async_trait::async_trait;

/// Suspends a call session between rounds.
///
/// Production uses [`TokioTimer`]; tests substitute a virtual clock so no
/// real time passes.
#[async_trait]
pub trait RoundTimer: Send + Sync {
    /// Wait for the given duration.
    async fn wait(&self, duration: Duration);
}

/// A timer backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl RoundTimer for TokioTimer {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
