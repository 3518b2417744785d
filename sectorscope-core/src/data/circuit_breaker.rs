//! Circuit breaker for data provider rate limiting and IP bans.
//!
//! When the provider returns HTTP 403 (IP ban) or repeated 429 (rate limit),
//! the breaker trips and refuses all requests for a cooldown period
//! (default 30 minutes).

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Requests are allowed.
    Closed,
    /// All requests are refused until the cooldown expires.
    Open { tripped_at: Instant },
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
}

/// Stops a batch from hammering a provider after a ban or rate limit.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold: 3,
        }
    }

    /// 30-minute cooldown, trips after 3 consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_allowed(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { tripped_at } => {
                if tripped_at.elapsed() >= self.cooldown {
                    inner.state = BreakerState::Closed;
                    inner.consecutive_failures = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        self.lock().consecutive_failures = 0;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            inner.state = BreakerState::Open {
                tripped_at: Instant::now(),
            };
            tracing::warn!(
                "circuit breaker tripped after {} consecutive failures",
                inner.consecutive_failures
            );
        }
    }

    /// Trip immediately (403 Forbidden).
    pub fn trip(&self) {
        self.lock().state = BreakerState::Open {
            tripped_at: Instant::now(),
        };
        tracing::warn!("circuit breaker tripped by provider refusal");
    }

    /// Remaining cooldown time (zero if not tripped).
    pub fn remaining_cooldown(&self) -> Duration {
        match self.lock().state {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { tripped_at } => self.cooldown.saturating_sub(tripped_at.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn trip_starts_a_full_cooldown() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        assert_eq!(cb.remaining_cooldown(), Duration::ZERO);
        cb.trip();
        assert!(!cb.is_allowed());
        let left = cb.remaining_cooldown();
        assert!(left > Duration::from_secs(55) && left <= Duration::from_secs(60));
    }

    #[test]
    fn failures_between_successes_do_not_accumulate() {
        let cb = CircuitBreaker::default_provider();
        for _ in 0..5 {
            cb.record_failure();
            cb.record_failure();
            cb.record_success();
        }
        assert!(cb.is_allowed());
    }

    #[test]
    fn reopening_clears_the_failure_count() {
        let cb = CircuitBreaker::new(Duration::from_millis(10));
        for _ in 0..3 {
            cb.record_failure();
        }
        assert!(!cb.is_allowed());
        std::thread::sleep(Duration::from_millis(15));
        assert!(cb.is_allowed());
        // one more failure must not trip it again straight away
        cb.record_failure();
        assert!(cb.is_allowed());
    }

    #[test]
    fn poisoned_lock_keeps_working() {
        let cb = Arc::new(CircuitBreaker::new(Duration::from_secs(60)));
        let held = Arc::clone(&cb);
        let _ = std::thread::spawn(move || {
            let _guard = held.lock();
            panic!("worker died while holding the breaker");
        })
        .join();

        assert!(cb.is_allowed());
        cb.trip();
        assert!(!cb.is_allowed());
    }
}
