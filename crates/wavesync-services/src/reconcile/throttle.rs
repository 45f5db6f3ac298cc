use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Enforces a minimum interval between consecutive remote calls.
#[derive(Debug)]
pub struct MinIntervalThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl MinIntervalThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until `interval` has elapsed since the last [`mark`](Self::mark).
    ///
    /// Returns `false` if `token` is cancelled first.
    pub async fn ready(&self, token: &CancellationToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        let Some(last) = self.last else {
            return true;
        };

        tokio::select! {
            _ = sleep_until(last + self.interval) => true,
            _ = token.cancelled() => false,
        }
    }

    /// Record that a remote call just completed.
    pub fn mark(&mut self) {
        self.last = Some(Instant::now());
    }
}
