//! Request pacing to stay under vendor rate limits.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces outgoing requests by a minimum interval.
///
/// Shared across all batches belonging to one vendor client. Pacing is
/// cooperative: every caller awaits [`RequestPacer::pace`] immediately
/// before issuing a request.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    /// Creates a pacer with the given minimum interval between requests.
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::const_new(None),
        }
    }

    /// Creates a pacer from a requests-per-second budget.
    #[must_use]
    pub const fn per_second(requests: u32) -> Self {
        let interval = if requests == 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_millis(1000 / requests as u64)
        };
        Self::new(interval)
    }

    /// Waits until the next request is allowed, then records it.
    pub async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
