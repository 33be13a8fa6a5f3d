//! Login throttling.
//!
//! One `governor` limiter per key (client IP and submitted email), so a
//! single address cannot brute force many accounts and a single account
//! cannot be attacked from many addresses.

use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};

use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};

type KeyRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub struct LoginRateLimiter {
    limiters: RwLock<HashMap<String, Arc<KeyRateLimiter>>>,
    quota: Quota,
}

impl LoginRateLimiter {
    /// `None` when `per_minute` is 0 (throttling disabled).
    pub fn new(per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(per_minute)?;
        Some(Self {
            limiters: RwLock::new(HashMap::new()),
            quota: Quota::per_minute(per_minute),
        })
    }

    fn limiter_for(&self, key: &str) -> Arc<KeyRateLimiter> {
        {
            let limiters = self
                .limiters
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(limiter) = limiters.get(key) {
                return limiter.clone();
            }
        }

        let mut limiters = self
            .limiters
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        limiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(GovRateLimiter::direct(self.quota)))
            .clone()
    }

    /// Consumes one attempt for `key`. On rejection returns the seconds to
    /// wait (at least 1).
    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.limiter_for(key).check().map_err(|not_until| {
            not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs()
                .max(1)
        })
    }

    /// Checks every key; all of them consume an attempt.
    pub fn check_all<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Result<(), u64> {
        keys.into_iter()
            .map(|key| self.check(key))
            .fold(Ok(()), |acc, r| match (acc, r) {
                (Err(a), Err(b)) => Err(a.max(b)),
                (Err(a), _) | (_, Err(a)) => Err(a),
                _ => Ok(()),
            })
    }
}

impl std::fmt::Debug for LoginRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRateLimiter")
            .field("quota", &self.quota)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables_limiter() {
        assert!(LoginRateLimiter::new(0).is_none());
    }

    #[test]
    fn test_exhaustion_is_per_key() {
        let limiter = LoginRateLimiter::new(2).unwrap();

        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        let retry_after = limiter.check("10.0.0.1").unwrap_err();
        assert!(retry_after >= 1);

        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_check_all_fails_when_any_key_is_exhausted() {
        let limiter = LoginRateLimiter::new(1).unwrap();
        assert!(limiter.check_all(["ip:1", "email:a@b.c"]).is_ok());
        assert!(limiter.check_all(["ip:2", "email:a@b.c"]).is_err());
    }
}
