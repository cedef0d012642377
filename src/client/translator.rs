//! Bounded-retry translation attempts.
//!
//! One `attempt` is the unit of work the drivers schedule: it owns the
//! pacing, the fixed-interval backoff, and the transient/fatal split, and
//! always comes back with a terminal outcome the caller can record.

use crate::client::{RateLimiter, TranslationService};
use crate::io::DebugLog;
use crate::models::TranslationOutcome;
use std::time::Duration;
use tracing::warn;

/// Wraps a translation backend with bounded, fixed-interval retries.
///
/// Every attempt, including retries, passes through the rate limiter.
pub struct Translator<S> {
    service: S,
    limiter: RateLimiter,
    max_retries: u32,
    retry_delay: Duration,
    debug_log: DebugLog,
}

impl<S: TranslationService> Translator<S> {
    pub fn new(
        service: S,
        limiter: RateLimiter,
        max_retries: u32,
        retry_delay: Duration,
        debug_log: DebugLog,
    ) -> Self {
        Self {
            service,
            limiter,
            max_retries,
            retry_delay,
            debug_log,
        }
    }

    /// Translate one sentence, retrying transient failures up to
    /// `max_retries` total attempts with a fixed delay in between.
    ///
    /// `Success` and `NoTranslation` return immediately; fatal errors are
    /// not retried; exhausted retries surface the last transient cause.
    pub async fn attempt(&mut self, id: u64, english: &str) -> TranslationOutcome {
        let mut last_cause = String::new();

        for attempt in 1..=self.max_retries {
            self.limiter.wait().await;

            match self.service.translate(english).await {
                Ok(Some(tunisian)) => return TranslationOutcome::Success { tunisian },
                Ok(None) => {
                    self.debug_log
                        .line(&format!("ID {id}: no fs-3 paragraph in response"));
                    return TranslationOutcome::NoTranslation;
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        id,
                        attempt,
                        max = self.max_retries,
                        error = %e,
                        "Transient translation error"
                    );
                    self.debug_log.line(&format!(
                        "ID {id}: attempt {attempt}/{}: {e}",
                        self.max_retries
                    ));
                    last_cause = e.to_string();
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                Err(e) => {
                    warn!(id, error = %e, "Fatal translation error");
                    self.debug_log.line(&format!("ID {id}: request failed - {e}"));
                    return TranslationOutcome::FatalError {
                        cause: e.to_string(),
                    };
                }
            }
        }

        TranslationOutcome::TransientError { cause: last_cause }
    }

    /// Pacing counters from the underlying rate limiter.
    pub fn limiter_stats(&self) -> crate::client::RateLimiterStats {
        self.limiter.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Result, ScrapeError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    struct AlwaysTransient {
        calls: AtomicU32,
    }

    impl TranslationService for AlwaysTransient {
        async fn translate(&self, _english: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ScrapeError::Http { status: 503 })
        }
    }

    struct AlwaysFatal {
        calls: AtomicU32,
    }

    impl TranslationService for AlwaysFatal {
        async fn translate(&self, _english: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ScrapeError::Http { status: 400 })
        }
    }

    struct NoCandidate;

    impl TranslationService for NoCandidate {
        async fn translate(&self, _english: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn translator<S: TranslationService>(service: S, max_retries: u32) -> Translator<S> {
        Translator::new(
            service,
            RateLimiter::new(Duration::ZERO),
            max_retries,
            Duration::ZERO,
            DebugLog::disabled(),
        )
    }

    #[tokio::test]
    async fn transient_errors_exhaust_exactly_max_retries() {
        let mut t = translator(AlwaysTransient { calls: AtomicU32::new(0) }, 3);
        let outcome = t.attempt(1, "hello").await;
        assert!(matches!(outcome, TranslationOutcome::TransientError { .. }));
        assert_eq!(t.service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let mut t = translator(AlwaysFatal { calls: AtomicU32::new(0) }, 3);
        let outcome = t.attempt(1, "hello").await;
        assert!(matches!(outcome, TranslationOutcome::FatalError { .. }));
        assert_eq!(t.service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_translation_returns_without_retry() {
        let mut t = translator(NoCandidate, 3);
        assert_eq!(t.attempt(1, "hello").await, TranslationOutcome::NoTranslation);
    }

    #[tokio::test]
    async fn retries_respect_the_rate_limiter() {
        let mut t = Translator::new(
            AlwaysTransient { calls: AtomicU32::new(0) },
            RateLimiter::new(Duration::from_millis(30)),
            3,
            Duration::ZERO,
            DebugLog::disabled(),
        );
        let start = Instant::now();
        t.attempt(1, "hello").await;
        // Three rate-limited attempts: two enforced gaps.
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
