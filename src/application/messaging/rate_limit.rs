//! Fail-fast rate limiting for outbound calls

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::application::errors::LookupError;

/// Rejects a call made sooner than `min_interval` after the last accepted
/// call for the same key. Nothing queues: callers get `RateLimited` and the
/// remaining wait.
pub struct RateLimiter {
    last_call: Mutex<HashMap<String, Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(HashMap::new()),
            min_interval,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn check(&self, key: &str) -> Result<(), LookupError> {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> Result<(), LookupError> {
        let mut last_call = self
            .last_call
            .lock()
            .map_err(|_| LookupError::Parse("Lock poisoned".to_string()))?;

        if let Some(previous) = last_call.get(key) {
            let elapsed = now.saturating_duration_since(*previous);
            if elapsed < self.min_interval {
                let retry_after = self.min_interval - elapsed;
                tracing::debug!("Rate limited \"{}\", retry after {:?}", key, retry_after);
                return Err(LookupError::RateLimited { retry_after });
            }
        }

        last_call.insert(key.to_string(), now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_passes() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        assert!(limiter.check("insult").is_ok());
    }

    #[test]
    fn test_fast_second_call_fails() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.check_at("insult", start).unwrap();

        let err = limiter.check_at("insult", start + Duration::from_secs(2)).unwrap_err();

        match err {
            LookupError::RateLimited { retry_after } => assert_eq!(retry_after, Duration::from_secs(3)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejected_calls_do_not_extend_the_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.check_at("insult", start).unwrap();
        assert!(limiter.check_at("insult", start + Duration::from_secs(4)).is_err());

        assert!(limiter.check_at("insult", start + Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.check_at("a", start).unwrap();
        assert!(limiter.check_at("b", start).is_ok());
    }

    #[test]
    fn test_zero_interval_never_limits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        limiter.check_at("a", start).unwrap();
        assert!(limiter.check_at("a", start).is_ok());
    }
}
