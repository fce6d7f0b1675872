//! Per-subscriber throttle in front of the upstream seat query.

use seatwatch_common::SubscriberId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces out upstream queries so one subscriber issues at most one per `min_interval`.
///
/// Foreground and background queries for the same subscriber share one slot
/// sequence; different subscribers never wait on each other.
pub struct RateLimiter {
    min_interval: Duration,
    /// Time at which the most recent query of each subscriber is allowed to run
    last_request: Mutex<HashMap<SubscriberId, Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(HashMap::new()),
        }
    }

    /// Reserve the next query slot for `subscriber` and return how long the caller
    /// must wait before issuing it.
    ///
    /// The reserved slot becomes the new `lastRequestAt`, so concurrent callers
    /// queue up behind each other instead of all seeing the same stale timestamp.
    pub async fn throttle(&self, subscriber: SubscriberId) -> Duration {
        let now = Instant::now();
        let mut last_request = self.last_request.lock().await;

        let slot = match last_request.get(&subscriber) {
            Some(last) => (*last + self.min_interval).max(now),
            None => now,
        };
        last_request.insert(subscriber, slot);

        slot - now
    }

    /// `throttle` followed by the wait it asked for
    pub async fn acquire(&self, subscriber: SubscriberId) {
        let wait = self.throttle(subscriber).await;
        if !wait.is_zero() {
            tracing::debug!("Rate limiting subscriber {} for {:?}", subscriber, wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Last reserved query time, if the subscriber ever queried
    pub async fn last_request_at(&self, subscriber: SubscriberId) -> Option<Instant> {
        self.last_request.lock().await.get(&subscriber).copied()
    }
}
