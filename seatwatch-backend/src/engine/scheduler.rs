//! Recurring per-watch timers.
//!
//! The scheduler only owns timer tasks. Whether a watch is still valid is
//! always decided by the registry, inside the check the timer runs.

use seatwatch_common::WatchKey;
use std::collections::HashMap;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

struct WatchTimer {
    watch_id: Uuid,
    handle: JoinHandle<()>,
}

/// Owns one periodic task per active watch, indexed by [`WatchKey`]
#[derive(Default)]
pub struct WatchScheduler {
    timers: Mutex<HashMap<WatchKey, WatchTimer>>,
}

impl WatchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer for watch generation `watch_id` of `key`.
    ///
    /// `check` runs every `period`, first after one full period. The timer stops
    /// itself once `check` returns `Break`.
    pub async fn start<F, Fut>(self: &Arc<Self>, key: WatchKey, watch_id: Uuid, period: Duration, mut check: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        // Held across spawn + insert so the task cannot release its slot before it exists
        let mut timers = self.timers.lock().await;

        let scheduler = Arc::clone(self);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if check().await.is_break() {
                    break;
                }
            }

            scheduler.release(&task_key, watch_id).await;
        });

        if let Some(stale) = timers.insert(key.clone(), WatchTimer { watch_id, handle }) {
            tracing::error!(
                "Timer for {} already existed (watch {}), aborting it",
                key,
                stale.watch_id
            );
            stale.handle.abort();
        }

        tracing::debug!("Started timer for {} (watch {}, every {:?})", key, watch_id, period);
    }

    /// Stop the timer of `key`. Returns whether one was running.
    pub async fn stop(&self, key: &WatchKey) -> bool {
        let timer = self.timers.lock().await.remove(key);
        match timer {
            Some(timer) => {
                timer.handle.abort();
                tracing::debug!("Stopped timer for {} (watch {})", key, timer.watch_id);
                true
            }
            None => false,
        }
    }

    /// Abort every timer
    pub async fn stop_all(&self) -> usize {
        let timers: Vec<_> = self.timers.lock().await.drain().collect();
        for (_, timer) in &timers {
            timer.handle.abort();
        }
        timers.len()
    }

    pub async fn active_timers(&self) -> usize {
        self.timers.lock().await.len()
    }

    pub async fn is_running(&self, key: &WatchKey) -> bool {
        self.timers.lock().await.contains_key(key)
    }

    /// Drop the slot of a timer that finished on its own
    async fn release(&self, key: &WatchKey, watch_id: Uuid) {
        let mut timers = self.timers.lock().await;
        if timers.get(key).is_some_and(|t| t.watch_id == watch_id) {
            timers.remove(key);
            tracing::debug!("Timer for {} finished (watch {})", key, watch_id);
        }
    }
}
