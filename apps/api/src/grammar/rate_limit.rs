//! Process-wide budget for calls to the external grammar engine.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// A shared call budget. Implementations must be safe to consult from many
/// concurrent requests; each successful `try_acquire` consumes one call.
pub trait CallBudget: Send + Sync {
    fn try_acquire(&self) -> bool;

    /// How long the most recently rejected caller has to wait for the next call.
    fn retry_after(&self) -> Duration;
}

/// GCRA limiter admitting a burst of `limit` calls, refilled at `limit` per `window`.
pub struct CallRateLimiter<C: Clock = DefaultClock> {
    limiter: RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<C::Instant>>,
    clock: C,
    last_wait_nanos: AtomicU64,
}

impl CallRateLimiter {
    pub fn new(limit: NonZeroU32, window: Duration) -> Result<Self> {
        Self::with_clock(limit, window, DefaultClock::default())
    }
}

impl<C: Clock> CallRateLimiter<C> {
    pub fn with_clock(limit: NonZeroU32, window: Duration, clock: C) -> Result<Self> {
        let quota = Quota::with_period(window / limit.get())
            .with_context(|| format!("Rate window {window:?} is too short for {limit} calls"))?
            .allow_burst(limit);
        Ok(Self {
            limiter: RateLimiter::direct_with_clock(quota, &clock),
            clock,
            last_wait_nanos: AtomicU64::new(0),
        })
    }
}

impl<C> CallBudget for CallRateLimiter<C>
where
    C: Clock + Send + Sync,
    C::Instant: Send + Sync,
{
    fn try_acquire(&self) -> bool {
        match self.limiter.check() {
            Ok(()) => true,
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                let nanos = u64::try_from(wait.as_nanos()).unwrap_or(u64::MAX);
                self.last_wait_nanos.store(nanos, Ordering::Relaxed);
                false
            }
        }
    }

    fn retry_after(&self) -> Duration {
        Duration::from_nanos(self.last_wait_nanos.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn limiter(
        limit: u32,
        window_secs: u64,
    ) -> (CallRateLimiter<FakeRelativeClock>, FakeRelativeClock) {
        let clock = FakeRelativeClock::default();
        let limiter = CallRateLimiter::with_clock(
            NonZeroU32::new(limit).unwrap(),
            Duration::from_secs(window_secs),
            clock.clone(),
        )
        .unwrap();
        (limiter, clock)
    }

    #[test]
    fn test_sixteenth_call_in_window_is_rejected() {
        let (limiter, _clock) = limiter(15, 60);
        for i in 0..15 {
            assert!(limiter.try_acquire(), "call {} should be admitted", i + 1);
        }
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_one_call_refills_per_window_share() {
        let (limiter, clock) = limiter(15, 60);
        for _ in 0..15 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());

        // 60s / 15 calls: one call comes back every 4s.
        clock.advance(Duration::from_secs(3));
        assert!(!limiter.try_acquire());
        clock.advance(Duration::from_secs(1));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_full_burst_returns_after_a_whole_window() {
        let (limiter, clock) = limiter(2, 60);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        clock.advance(Duration::from_secs(60));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_rejected_calls_do_not_consume_budget() {
        let (limiter, clock) = limiter(1, 60);
        assert!(limiter.try_acquire());
        for _ in 1..50 {
            clock.advance(Duration::from_secs(1));
            assert!(!limiter.try_acquire());
        }
        clock.advance(Duration::from_secs(11));
        assert!(limiter.try_acquire());
    }

    #[test]
    fn test_retry_after_reports_wait_of_last_rejection() {
        let (limiter, clock) = limiter(1, 60);
        assert_eq!(limiter.retry_after(), Duration::ZERO);
        assert!(limiter.try_acquire());

        clock.advance(Duration::from_secs(45));
        assert!(!limiter.try_acquire());
        assert_eq!(limiter.retry_after(), Duration::from_secs(15));
    }

    #[test]
    fn test_window_too_short_for_limit_is_rejected() {
        let result = CallRateLimiter::with_clock(
            NonZeroU32::new(15).unwrap(),
            Duration::from_nanos(10),
            FakeRelativeClock::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_concurrent_callers_cannot_exceed_limit() {
        let (limiter, _clock) = limiter(15, 60);
        let limiter = Arc::new(limiter);
        let admitted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        if limiter.try_acquire() {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 15);
    }
}
