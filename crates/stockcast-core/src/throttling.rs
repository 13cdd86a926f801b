use std::num::NonZeroU32;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

static ALPHAVANTAGE_BUDGET: OnceLock<RateBudget> = OnceLock::new();

/// Shared call budget for a rate-limited upstream.
///
/// Clones share one limiter, so every handle draws from the same quota.
/// Running out of budget is reported, never waited out.
#[derive(Clone)]
pub struct RateBudget {
    limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
    capacity: NonZeroU32,
}

impl std::fmt::Debug for RateBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateBudget")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl RateBudget {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let capacity = NonZeroU32::new(quota_limit).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(
                quota_window,
                capacity,
            ))),
            clock: DefaultClock::default(),
            capacity,
        }
    }

    /// Alpha Vantage free tier: five calls per minute.
    pub fn alphavantage_free_tier() -> Self {
        Self::new(Duration::from_secs(60), 5)
    }

    /// The process-wide Alpha Vantage budget. The quota belongs to the API
    /// key, so every gateway built by [`DataSourceGateway::new`] draws from
    /// this one limiter.
    ///
    /// [`DataSourceGateway::new`]: crate::DataSourceGateway::new
    pub fn alphavantage_shared() -> Self {
        ALPHAVANTAGE_BUDGET
            .get_or_init(Self::alphavantage_free_tier)
            .clone()
    }

    /// Most calls the budget can ever grant at once.
    pub const fn capacity(&self) -> u32 {
        self.capacity.get()
    }

    /// True when both handles draw from the same limiter.
    pub fn shares_quota_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.limiter, &other.limiter)
    }

    /// Takes one call from the budget, or returns how long until one frees up.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Takes `calls` from the budget all at once or none at all. A request
    /// above [`capacity`](Self::capacity) can never be granted and reports
    /// `Duration::MAX`.
    pub fn try_acquire_n(&self, calls: u32) -> Result<(), Duration> {
        let Some(calls) = NonZeroU32::new(calls) else {
            return Ok(());
        };
        match self.limiter.check_n(calls) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(not_until)) => Err(not_until.wait_time_from(self.clock.now())),
            Err(_) => Err(Duration::MAX),
        }
    }
}

fn quota_from_window(quota_window: Duration, burst: NonZeroU32) -> Quota {
    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(burst.get())).max(0.001);

    Quota::with_period(Duration::from_secs_f64(seconds_per_cell))
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
