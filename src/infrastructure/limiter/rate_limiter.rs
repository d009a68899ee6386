use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::constants::{RATE_LIMIT_MAX, RATE_LIMIT_WINDOW};
use crate::repositories::rate_limit::{RateDecision, RateLimiter};
use super::clock::{Clock, SystemClock};

/// Counter for one client key inside a fixed window
#[derive(Debug)]
struct WindowBucket {
    count: u32,
    reset_at: Instant,
}

impl WindowBucket {
    fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            reset_at: now + window,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.reset_at <= now
    }
}

type Key = String;

/// Fixed-window limiter. A key's first request opens a window; the window
/// is replaced once `reset_at` has passed. State is local to this process.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    map: Arc<DashMap<Key, Arc<Mutex<WindowBucket>>>>,
    clock: Arc<dyn Clock>,
    max_requests: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            clock,
            max_requests,
            window,
        }
    }

    fn get_bucket(&self, key: &str, now: Instant) -> (Arc<Mutex<WindowBucket>>, bool) {
        if let Some(existing) = self.map.get(key) {
            return (existing.clone(), false);
        }
        match self.map.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => (entry.get().clone(), false),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let bucket = Arc::new(Mutex::new(WindowBucket::open(now, self.window)));
                entry.insert(bucket.clone());
                (bucket, true)
            }
        }
    }

    /// Drops buckets whose window already ended. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.map.len();
        self.map.retain(|_, bucket| !bucket.lock().is_expired(now));
        before.saturating_sub(self.map.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_MAX, RATE_LIMIT_WINDOW)
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, key: &str) -> RateDecision {
        let now = self.clock.now();
        let (bucket, created) = self.get_bucket(key, now);
        if created {
            return RateDecision::Allowed {
                remaining: self.max_requests.saturating_sub(1),
            };
        }

        let mut b = bucket.lock();
        if b.is_expired(now) {
            *b = WindowBucket::open(now, self.window);
        } else if b.count >= self.max_requests {
            return RateDecision::Denied {
                retry_after: b.reset_at.saturating_duration_since(now),
            };
        } else {
            b.count += 1;
        }

        RateDecision::Allowed {
            remaining: self.max_requests.saturating_sub(b.count),
        }
    }
}
