use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::SourceError;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Client-side request budget for one upstream API.
///
/// When the budget is spent the call fails fast with `source.rate_limited`
/// instead of waiting, so the strategy can move on within its deadline.
#[derive(Clone)]
pub struct Throttle {
    upstream: &'static str,
    limiter: Arc<DirectRateLimiter>,
}

impl Throttle {
    pub fn new(upstream: &'static str, window: Duration, limit: u32) -> Self {
        Self {
            upstream,
            limiter: Arc::new(RateLimiter::direct(quota_from_window(window, limit))),
        }
    }

    /// Naver's shopping search API allows 10 calls per second per application.
    pub fn naver() -> Self {
        Self::new("naver", Duration::from_secs(1), 10)
    }

    pub fn kurly() -> Self {
        Self::new("kurly", Duration::from_secs(1), 5)
    }

    pub fn acquire(&self) -> Result<(), SourceError> {
        self.limiter.check().map_err(|_| {
            SourceError::rate_limited(format!("{} client-side request budget exhausted", self.upstream))
        })
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("upstream", &self.upstream)
            .finish_non_exhaustive()
    }
}

fn quota_from_window(window: Duration, limit: u32) -> Quota {
    let burst = NonZeroU32::new(limit.max(1)).unwrap_or(NonZeroU32::MIN);
    let seconds_per_cell = (window.as_secs_f64() / f64::from(burst.get())).max(0.001);

    Quota::with_period(Duration::from_secs_f64(seconds_per_cell))
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
