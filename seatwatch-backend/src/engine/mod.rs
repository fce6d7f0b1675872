//! Seat availability watch engine
//!
//! `submit` runs one immediate query and, when the section is full, registers
//! a watch whose timer re-checks it every [`POLL_INTERVAL`]. The first check
//! that sees an open seat removes the watch and dispatches exactly one
//! notification.
//!
//! ## Main Components
//! - `WatchRegistry`: source of truth for which watches exist
//! - `WatchScheduler`: one recurring timer task per watch
//! - `RateLimiter`: per-subscriber spacing of upstream queries
//! - `Notifier`: queue feeding the chat delivery worker

mod notifier;
mod rate_limit;
mod registry;
mod scheduler;

pub use notifier::{MessageChannel, Notification, Notifier, spawn_delivery};
pub use rate_limit::RateLimiter;
pub use registry::{TryCreate, WatchEntry, WatchRegistry, WatchState};
pub use scheduler::WatchScheduler;

use crate::source::{CatalogResolver, QueryError, SeatSource};
use seatwatch_common::{SeatStatus, SubscriberId, WatchKey};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Minimum spacing between two upstream queries of one subscriber
pub const MIN_INTERVAL: Duration = Duration::from_secs(2);

/// Re-check period of an active watch
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Which half of a `PROGRAM_CRN` request is unknown upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Program,
    Section,
}

/// Reply to a submitted section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImmediateResult {
    NotFound(Missing),
    /// Seats are open right now; nothing to watch
    Available(SeatStatus),
    /// Section is full and a new watch was registered
    WatchStarted(SeatStatus),
    /// Section is full and already watched by this subscriber
    AlreadyWatched(SeatStatus),
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("upstream query failed: {0}")]
    Upstream(#[from] QueryError),
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// Handle to the engine; cheap to clone, all clones share state
#[derive(Clone)]
pub struct WatchEngine {
    registry: Arc<WatchRegistry>,
    scheduler: Arc<WatchScheduler>,
    limiter: Arc<RateLimiter>,
    catalog: Arc<dyn CatalogResolver>,
    source: Arc<dyn SeatSource>,
    notifier: Notifier,
}

impl WatchEngine {
    pub fn new(
        catalog: Arc<dyn CatalogResolver>,
        source: Arc<dyn SeatSource>,
        notifier: Notifier,
    ) -> Self {
        Self {
            registry: Arc::new(WatchRegistry::new()),
            scheduler: Arc::new(WatchScheduler::new()),
            limiter: Arc::new(RateLimiter::new(MIN_INTERVAL)),
            catalog,
            source,
            notifier,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogResolver> {
        &self.catalog
    }

    /// Check a section now and start watching it if it is full
    pub async fn submit(
        &self,
        subscriber: SubscriberId,
        program: &str,
        section: &str,
    ) -> Result<ImmediateResult, WatchError> {
        let key = WatchKey::new(subscriber, program, section);

        let Some(provider_id) = self.catalog.resolve(key.program()) else {
            tracing::info!("Unknown program code {} requested by {}", key.program(), subscriber);
            return Ok(ImmediateResult::NotFound(Missing::Program));
        };

        self.limiter.acquire(subscriber).await;
        let status = self
            .source
            .query(&provider_id, key.section())
            .await
            .inspect_err(|e| tracing::warn!("Foreground query for {} failed ({}): {}", key, e.kind(), e))?;

        if !status.found {
            tracing::info!("Section {} not found upstream", key.target);
            return Ok(ImmediateResult::NotFound(Missing::Section));
        }
        if status.open_seats() > 0 {
            tracing::info!("{} already has {} open seats", key.target, status.open_seats());
            return Ok(ImmediateResult::Available(status));
        }

        match self.registry.try_create(key.clone()).await {
            TryCreate::Created(watch_id) => {
                self.start_timer(key.clone(), watch_id).await;
                tracing::info!("Watching {} (watch {})", key, watch_id);
                Ok(ImmediateResult::WatchStarted(status))
            }
            TryCreate::AlreadyExists => Ok(ImmediateResult::AlreadyWatched(status)),
        }
    }

    /// Active watches of `subscriber`, oldest first
    pub async fn status(&self, subscriber: SubscriberId) -> Vec<WatchKey> {
        self.watches(subscriber).await.into_iter().map(|e| e.key).collect()
    }

    /// Active watch entries of `subscriber`, oldest first
    pub async fn watches(&self, subscriber: SubscriberId) -> Vec<WatchEntry> {
        self.registry.list_by_subscriber(subscriber).await
    }

    /// Cancel every watch of `subscriber`, returning how many were removed
    pub async fn cancel(&self, subscriber: SubscriberId) -> usize {
        self.cancel_all(subscriber).await.len()
    }

    /// Cancel every watch of `subscriber`, returning the removed keys
    pub async fn cancel_all(&self, subscriber: SubscriberId) -> Vec<WatchKey> {
        let removed = self.registry.remove_all_for_subscriber(subscriber).await;
        for key in &removed {
            self.scheduler.stop(key).await;
        }
        if !removed.is_empty() {
            tracing::info!("Cancelled {} watches of {}", removed.len(), subscriber);
        }
        removed
    }

    /// Cancel a single watch. Returns whether it existed.
    pub async fn cancel_one(&self, key: &WatchKey) -> bool {
        if self.registry.remove(key).await.is_none() {
            return false;
        }
        self.scheduler.stop(key).await;
        tracing::info!("Cancelled watch {}", key);
        true
    }

    /// Number of watches across all subscribers
    pub async fn active_watches(&self) -> usize {
        self.registry.len().await
    }

    /// Stop every timer. Registry contents are left as they are.
    pub async fn shutdown(&self) {
        let stopped = self.scheduler.stop_all().await;
        tracing::info!("Watch engine stopped ({} timers aborted)", stopped);
    }

    async fn start_timer(&self, key: WatchKey, watch_id: Uuid) {
        let engine = self.clone();
        let task_key = key.clone();
        self.scheduler
            .start(key, watch_id, POLL_INTERVAL, move || {
                let engine = engine.clone();
                let key = task_key.clone();
                async move { engine.check_watch(&key, watch_id).await }
            })
            .await;
    }

    /// One timer fire. `Break` stops the timer.
    async fn check_watch(&self, key: &WatchKey, watch_id: Uuid) -> ControlFlow<()> {
        match self.registry.get(key).await {
            Some(entry) if entry.watch_id == watch_id => {}
            _ => {
                tracing::debug!("Watch {} ({}) is gone, stopping its timer", key, watch_id);
                return ControlFlow::Break(());
            }
        }

        let Some(provider_id) = self.catalog.resolve(key.program()) else {
            let err = WatchError::Invariant(format!("program {} no longer resolves", key.program()));
            tracing::error!("Dropping watch {}: {}", key, err);
            self.registry.discard(key, watch_id).await;
            return ControlFlow::Break(());
        };

        self.limiter.acquire(key.subscriber).await;
        let status = match self.source.query(&provider_id, key.section()).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Background check of {} failed ({}): {}", key, e.kind(), e);
                return ControlFlow::Continue(());
            }
        };

        if !status.has_open_seats() {
            tracing::debug!(
                "{} still full ({}/{}, found: {})",
                key,
                status.enrolled,
                status.capacity,
                status.found
            );
            return ControlFlow::Continue(());
        }

        let notifier = &self.notifier;
        let completed = self
            .registry
            .complete(key, watch_id, |entry| notifier.notify(&entry.key, &status))
            .await;

        if completed {
            tracing::info!("Seat opened for {} ({} open), watch completed", key, status.open_seats());
        } else {
            tracing::debug!("Watch {} was cancelled during its check, not notifying", key);
        }
        ControlFlow::Break(())
    }
}
