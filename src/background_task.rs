use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::limiter::rate_limiter::FixedWindowLimiter;

/// Periodically forgets rate-limit buckets whose window has closed.
pub async fn start_purge_task(limiter: FixedWindowLimiter, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let purged = limiter.purge_expired();
        if purged > 0 {
            tracing::debug!(
                purged,
                remaining = limiter.tracked_keys(),
                "Purged expired rate-limit buckets"
            );
        }
    }
}
