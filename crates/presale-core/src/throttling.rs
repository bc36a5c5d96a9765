use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Self-imposed request budget: `permits` fetch cycles per `window`.
#[derive(Clone)]
pub struct FetchThrottle {
    limiter: Arc<DirectRateLimiter>,
    window: Duration,
}

impl FetchThrottle {
    pub fn new(window: Duration, permits: u32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(window, permits))),
            window,
        }
    }

    /// One cycle per window.
    pub fn per_window(window: Duration) -> Self {
        Self::new(window, 1)
    }

    /// Takes one permit if the budget allows it.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

fn quota_from_window(window: Duration, permits: u32) -> Quota {
    let burst = NonZeroU32::new(permits.max(1)).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (window.as_secs_f64() / f64::from(burst.get())).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
        .allow_burst(burst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_cycle_inside_window_is_refused() {
        let throttle = FetchThrottle::per_window(Duration::from_secs(60));

        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[test]
    fn burst_allows_multiple_cycles() {
        let throttle = FetchThrottle::new(Duration::from_secs(60), 2);

        assert!(throttle.try_acquire());
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[test]
    fn budget_refills_after_window() {
        let throttle = FetchThrottle::per_window(Duration::from_millis(5));

        assert!(throttle.try_acquire());
        std::thread::sleep(Duration::from_millis(20));
        assert!(throttle.try_acquire());
    }
}
