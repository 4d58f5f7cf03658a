use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::OntoError;

#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    calls_per_second: f64,
    next_slot: Mutex<Option<Instant>>,
}

static SHARED: OnceLock<Arc<RateLimiter>> = OnceLock::new();

// One call an hour. Slower rates would push slot instants past what
// `Instant` can represent.
pub const MIN_CALLS_PER_SECOND: f64 = 1.0 / 3600.0;

pub fn validate_rate(calls_per_second: f64) -> Result<(), OntoError> {
    if !calls_per_second.is_finite() || calls_per_second < MIN_CALLS_PER_SECOND {
        return Err(OntoError::InvalidConfig(format!(
            "rate limit must be at least one call per hour, got {calls_per_second} calls per second"
        )));
    }
    Ok(())
}

impl RateLimiter {
    pub fn new(calls_per_second: f64) -> Result<Self, OntoError> {
        validate_rate(calls_per_second)?;
        Ok(Self {
            interval: Duration::from_nanos((1e9 / calls_per_second).round() as u64),
            calls_per_second,
            next_slot: Mutex::new(None),
        })
    }

    // The first caller fixes the rate; later callers asking for another one
    // share it anyway.
    pub fn shared(calls_per_second: f64) -> Result<Arc<Self>, OntoError> {
        if let Some(existing) = SHARED.get() {
            warn_if_different(existing, calls_per_second);
            return Ok(Arc::clone(existing));
        }
        let limiter = Arc::new(Self::new(calls_per_second)?);
        let existing = SHARED.get_or_init(|| limiter);
        warn_if_different(existing, calls_per_second);
        Ok(Arc::clone(existing))
    }

    pub fn calls_per_second(&self) -> f64 {
        self.calls_per_second
    }

    pub fn acquire(&self) -> Duration {
        let slot = self.reserve(Instant::now());
        let now = Instant::now();
        if slot > now {
            let wait = slot - now;
            thread::sleep(wait);
            wait
        } else {
            Duration::ZERO
        }
    }

    fn reserve(&self, now: Instant) -> Instant {
        let mut next = match self.next_slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let slot = match *next {
            Some(free) if free > now => free,
            _ => now,
        };
        *next = Some(slot + self.interval);
        slot
    }
}

fn warn_if_different(existing: &RateLimiter, requested: f64) {
    if (existing.calls_per_second - requested).abs() > f64::EPSILON {
        warn!(
            current = existing.calls_per_second,
            requested, "process-wide rate limiter already configured, keeping current rate"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_rates() {
        assert!(RateLimiter::new(0.0).is_err());
        assert!(RateLimiter::new(-3.0).is_err());
        assert!(RateLimiter::new(f64::NAN).is_err());
    }

    #[test]
    fn rejects_rates_below_one_call_an_hour() {
        assert!(RateLimiter::new(1e-300).is_err());
        assert!(RateLimiter::new(1.0 / 7200.0).is_err());
        let slowest = RateLimiter::new(MIN_CALLS_PER_SECOND).unwrap();
        let start = Instant::now();
        slowest.reserve(start);
        assert_eq!(slowest.reserve(start) - start, Duration::from_secs(3600));
    }

    #[test]
    fn slots_are_evenly_spaced() {
        let limiter = RateLimiter::new(10.0).unwrap();
        let start = Instant::now();
        let first = limiter.reserve(start);
        let second = limiter.reserve(start);
        let third = limiter.reserve(start);
        assert_eq!(first, start);
        assert_eq!(second - first, Duration::from_millis(100));
        assert_eq!(third - second, Duration::from_millis(100));
    }

    #[test]
    fn idle_time_does_not_bank_credit() {
        let limiter = RateLimiter::new(10.0).unwrap();
        let start = Instant::now();
        limiter.reserve(start);
        let later = start + Duration::from_secs(5);
        assert_eq!(limiter.reserve(later), later);
        assert_eq!(
            limiter.reserve(later),
            later + Duration::from_millis(100)
        );
    }

    #[test]
    fn thirty_calls_at_fifteen_per_second_take_about_two_seconds() {
        let limiter = RateLimiter::new(15.0).unwrap();
        let start = Instant::now();
        for _ in 0..30 {
            limiter.acquire();
        }
        assert!(start.elapsed() >= Duration::from_millis(1900));
    }
}
