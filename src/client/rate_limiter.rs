//! Fixed-interval rate limiter for the translation service.
//!
//! The service expects simple, even spacing between requests rather than
//! burst quotas, so the limiter tracks a single instant: when the previous
//! `wait()` returned.

use std::time::{Duration, Instant};
use tracing::debug;

/// Enforces a minimum wall-clock interval between outbound requests.
///
/// The pipeline is strictly sequential, so there is exactly one caller and
/// no queueing of concurrent waiters.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Instant>,
    total_requests: u64,
    total_waited: Duration,
}

impl RateLimiter {
    /// Create a limiter with the given minimum spacing.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            total_requests: 0,
            total_waited: Duration::ZERO,
        }
    }

    /// Suspend until at least the configured interval has elapsed since the
    /// previous `wait()` returned. The first call never waits.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let remaining = self.interval - elapsed;
                debug!(wait_ms = remaining.as_millis() as u64, "Waiting for rate limit");
                self.total_waited += remaining;
                tokio::time::sleep(remaining).await;
            }
        }
        self.total_requests += 1;
        self.last = Some(Instant::now());
    }

    /// Get pacing counters.
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            total_requests: self.total_requests,
            total_wait_secs: self.total_waited.as_secs_f64(),
        }
    }
}

/// Rate limiter statistics.
#[derive(Debug, Clone)]
pub struct RateLimiterStats {
    pub total_requests: u64,
    pub total_wait_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_wait_is_immediate() {
        let mut limiter = RateLimiter::new(Duration::from_millis(200));
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn consecutive_waits_are_spaced() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        // Two enforced gaps after the free first call.
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(limiter.stats().total_requests, 3);
    }

    #[tokio::test]
    async fn zero_interval_never_waits() {
        let mut limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
