use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use tracing::trace;

use crate::ProviderId;

type KeyedRateLimiter = RateLimiter<ProviderId, DefaultKeyedStateStore<ProviderId>, DefaultClock>;

/// Enforces a minimum spacing between calls to the same upstream provider.
///
/// Calls to different providers never wait on each other.
#[derive(Clone)]
pub struct Pacer {
    limiter: Option<Arc<KeyedRateLimiter>>,
    spacing: Duration,
}

impl Pacer {
    /// A pacer allowing one call per `spacing` per provider.
    ///
    /// A zero spacing disables pacing entirely.
    pub fn new(spacing: Duration) -> Self {
        let limiter = Quota::with_period(spacing)
            .map(|quota| quota.allow_burst(NonZeroU32::MIN))
            .map(|quota| Arc::new(RateLimiter::keyed(quota)));

        Self { limiter, spacing }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Waits until `provider` may be called again.
    pub async fn until_ready(&self, provider: ProviderId) {
        if let Some(limiter) = &self.limiter {
            trace!(%provider, "waiting for pacing slot");
            limiter.until_key_ready(&provider).await;
        }
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("spacing", &self.spacing)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
