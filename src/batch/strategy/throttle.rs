//! Fixed spacing between consecutive batch items.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Spaces successive [`acquire`](Self::acquire) calls by a fixed interval.
///
/// The first call returns immediately; each later call waits until the
/// interval has elapsed since the previous permit was granted.
#[derive(Debug)]
pub struct FixedIntervalThrottle {
    interval: Duration,
    last_granted: Mutex<Option<Instant>>,
}

impl FixedIntervalThrottle {
    /// Creates a throttle with the given spacing.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_granted: Mutex::new(None),
        }
    }

    /// Waits for the next permit.
    pub async fn acquire(&self) {
        let mut last_granted = self.last_granted.lock().await;
        if let Some(previous) = *last_granted {
            sleep_until(previous + self.interval).await;
        }
        *last_granted = Some(Instant::now());
    }
}
