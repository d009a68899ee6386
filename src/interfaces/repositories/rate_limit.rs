use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Per-client admission control consulted before any payload is read.
pub trait RateLimiter: Send + Sync {
    /// Counts one request against `key` and reports whether it may proceed.
    fn check(&self, key: &str) -> RateDecision;
}
