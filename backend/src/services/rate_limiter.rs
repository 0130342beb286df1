use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep, Duration, Instant};

/// Concurrent requests allowed against the quote provider.
pub const MAX_CONCURRENT_QUOTES: usize = 3;

/// Throttles calls to the market-data provider.
///
/// Finnhub's free tier allows 60 calls per minute; the limiter keeps both the
/// number of in-flight requests and the spacing between requests in check.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    /// Earliest instant the next request may start.
    next_slot: Arc<Mutex<Instant>>,
    min_delay: Duration,
}

impl RateLimiter {
    pub fn new(max_concurrent: usize, requests_per_minute: u32) -> Self {
        let min_delay_ms = 60_000 / requests_per_minute.max(1) as u64;
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            next_slot: Arc::new(Mutex::new(Instant::now())),
            min_delay: Duration::from_millis(min_delay_ms),
        }
    }

    /// Waits for a free slot and for the minimum spacing since the last request.
    ///
    /// The slot is released when the returned guard is dropped.
    pub async fn acquire(&self) -> Result<RateLimitGuard, AcquireError> {
        let permit = self.semaphore.clone().acquire_owned().await?;

        // Reserve the start time under the lock; each caller gets its own slot.
        let wait = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let start = (*next).max(now);
            *next = start + self.min_delay;
            start - now
        };

        if !wait.is_zero() {
            sleep(wait).await;
        }

        Ok(RateLimitGuard { _permit: permit })
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }
}

pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}
