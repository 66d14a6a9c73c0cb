//! Process-wide token bucket guarding LLM calls
//!
//! One limiter is constructed at startup and shared through an `Arc` by every
//! client that talks to the completion endpoint. The bucket starts with a
//! single token and holds at most `max(max_rps, 1)`, so a cold start admits
//! one call immediately and paces every following call at `1 / max_rps`
//! seconds.
//!
//! A caller that finds the bucket empty reserves its token anyway (the
//! balance goes negative), releases the lock and sleeps for its deficit.
//! Later callers therefore queue behind earlier reservations without holding
//! the lock while they wait. Wake-up order between waiters is not guaranteed.

use crate::LlmError;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Token bucket rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    max_rps: f64,
    capacity: f64,
    state: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a limiter admitting at most `max_rps` calls per second
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if `max_rps` is not a finite positive number.
    pub fn new(max_rps: f64) -> Result<Self, LlmError> {
        if !max_rps.is_finite() || max_rps <= 0.0 {
            return Err(LlmError::Config(format!(
                "max_rps must be a positive number, got {}",
                max_rps
            )));
        }

        Ok(Self {
            max_rps,
            capacity: max_rps.max(1.0),
            state: Mutex::new(Bucket {
                tokens: 1.0,
                last_refill: Instant::now(),
            }),
        })
    }

    /// Configured rate in calls per second
    pub fn max_rps(&self) -> f64 {
        self.max_rps
    }

    /// Block until a call may proceed and return how long the caller waited
    pub fn acquire(&self) -> Duration {
        let wait = self.reserve();
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "Rate limiter pacing call");
            thread::sleep(wait);
        }
        wait
    }

    /// Take a token, returning the deficit the caller must sleep off
    fn reserve(&self) -> Duration {
        let mut bucket = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.max_rps).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Duration::ZERO;
        }

        let deficit = (1.0 - bucket.tokens) / self.max_rps;
        bucket.tokens -= 1.0;
        Duration::from_secs_f64(deficit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_rejects_invalid_rate() {
        assert!(matches!(RateLimiter::new(0.0), Err(LlmError::Config(_))));
        assert!(matches!(RateLimiter::new(-1.0), Err(LlmError::Config(_))));
        assert!(matches!(RateLimiter::new(f64::NAN), Err(LlmError::Config(_))));
        assert!(RateLimiter::new(0.5).is_ok());
    }

    #[test]
    fn test_first_call_is_immediate() {
        let limiter = RateLimiter::new(2.0).unwrap();
        assert_eq!(limiter.acquire(), Duration::ZERO);
    }

    #[test]
    fn test_back_to_back_calls_are_paced() {
        let rate = 20.0;
        let calls = 5;
        let limiter = RateLimiter::new(rate).unwrap();

        let start = Instant::now();
        for _ in 0..calls {
            limiter.acquire();
        }
        let elapsed = start.elapsed().as_secs_f64();

        let expected = (calls - 1) as f64 / rate;
        assert!(elapsed >= expected * 0.98, "elapsed {elapsed} < {expected}");
        assert!(elapsed < expected + 0.15, "elapsed {elapsed} too long");
    }

    #[test]
    fn test_capacity_is_rate_with_one_token_floor() {
        assert_eq!(RateLimiter::new(4.0).unwrap().capacity, 4.0);
        assert_eq!(RateLimiter::new(1.0).unwrap().capacity, 1.0);
        assert_eq!(RateLimiter::new(0.5).unwrap().capacity, 1.0);
    }

    #[test]
    fn test_idle_bucket_admits_a_burst_up_to_capacity() {
        let limiter = RateLimiter::new(50.0).unwrap();
        thread::sleep(Duration::from_millis(200));
        for _ in 0..5 {
            assert_eq!(limiter.acquire(), Duration::ZERO);
        }
    }

    #[test]
    fn test_slow_rate_still_admits_first_call() {
        let limiter = RateLimiter::new(0.5).unwrap();
        assert_eq!(limiter.acquire(), Duration::ZERO);
    }

    #[test]
    fn test_idle_time_refills_bucket() {
        let limiter = RateLimiter::new(10.0).unwrap();
        limiter.acquire();
        thread::sleep(Duration::from_millis(150));
        assert_eq!(limiter.acquire(), Duration::ZERO);
    }

    #[test]
    fn test_concurrent_callers_share_the_budget() {
        let rate = 20.0;
        let limiter = Arc::new(RateLimiter::new(rate).unwrap());

        let start = Instant::now();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || limiter.acquire())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Four callers at 20 rps: the last reservation waits three intervals
        assert!(start.elapsed().as_secs_f64() >= 3.0 / rate * 0.98);
    }
}
