//! Retry logic with exponential backoff and server-directed rate-limit delays.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::data_source::{SourceError, SourceErrorKind};

/// Retry configuration for one call-site family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further attempt.
    pub base_delay: Duration,
    /// Whether to apply random jitter (+/- 50%) to backoff delays.
    pub jitter: bool,
    /// Upper bound for both backoff and `Retry-After` delays.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            jitter: false,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Exponential delay after the given failed attempt (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(30) as i32;
        let seconds = self.base_delay.as_secs_f64() * 2_f64.powi(exponent);
        let capped_seconds = seconds.min(self.max_delay.as_secs_f64());

        let mut delay = Duration::from_secs_f64(capped_seconds);

        if self.jitter {
            let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
            let random_offset = fastrand::u64(0..=(jitter_ms * 2));
            let total_ms = delay.as_millis() as i64 + (random_offset as i64 - jitter_ms as i64);
            delay = Duration::from_millis(total_ms.max(0) as u64);
        }

        delay
    }

    /// Delay to wait after `error` ended the given attempt.
    ///
    /// Rate-limited errors carrying a server delay use it verbatim (bounded by
    /// `max_delay`); everything else falls back to exponential backoff.
    pub fn delay_after(&self, attempt: u32, error: &SourceError) -> Duration {
        match (error.kind(), error.retry_after()) {
            (SourceErrorKind::RateLimited, Some(retry_after)) => retry_after.min(self.max_delay),
            _ => self.backoff_delay(attempt),
        }
    }
}

/// Suspends the calling task between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Sleeper that returns immediately and records requested delays,
/// for deterministic offline tests.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .map(|delays| delays.clone())
            .unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.delays().into_iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(duration);
        }
        Box::pin(std::future::ready(()))
    }
}

/// Runs fallible upstream calls under a [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn with_tokio(policy: RetryPolicy) -> Self {
        Self::new(policy, Arc::new(TokioSleeper))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invokes `call` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent. The last error is returned on exhaustion.
    pub async fn run<T, F, Fut>(&self, what: &str, mut call: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(what, attempt, "upstream call recovered after retry");
                    }
                    return Ok(value);
                }
                Err(error) if !error.retryable() => return Err(error),
                Err(error) if attempt >= max_attempts => {
                    warn!(what, attempts = attempt, error = %error, "retry budget exhausted");
                    return Err(error);
                }
                Err(error) => {
                    let delay = self.policy.delay_after(attempt, &error);
                    warn!(
                        what,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "upstream call failed; retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
