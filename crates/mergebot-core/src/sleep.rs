use std::time::Duration;

use async_trait::async_trait;

/// Waits between retries.
#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait SleepService: Send + Sync {
    /// Sleep for a duration.
    async fn sleep_for_duration(&self, duration: Duration);
}

/// Sleep service backed by the tokio timer.
#[derive(Clone, Default)]
pub struct TokioSleepService {
    _private: (),
}

impl TokioSleepService {
    /// Creates a new sleep service.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

#[async_trait]
impl SleepService for TokioSleepService {
    async fn sleep_for_duration(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}
