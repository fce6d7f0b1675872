//! Authoritative in-memory table of active watches.

use chrono::{DateTime, Utc};
use seatwatch_common::{SubscriberId, WatchKey};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Active,
    Completed,
}

/// One standing watch
#[derive(Debug, Clone)]
pub struct WatchEntry {
    pub key: WatchKey,
    /// Generation id; the scheduler binds its timer to this, not only to the key
    pub watch_id: Uuid,
    pub state: WatchState,
    pub created_at: DateTime<Utc>,
}

/// Outcome of [`WatchRegistry::try_create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryCreate {
    Created(Uuid),
    AlreadyExists,
}

/// Watch entries grouped per subscriber, each group in insertion order.
///
/// One coarse lock guards the whole table. Every operation is a short
/// in-memory critical section, never held across upstream I/O.
#[derive(Default)]
pub struct WatchRegistry {
    watches: Mutex<HashMap<SubscriberId, Vec<WatchEntry>>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an `Active` entry iff none exists for `key`
    pub async fn try_create(&self, key: WatchKey) -> TryCreate {
        let mut watches = self.watches.lock().await;
        let entries = watches.entry(key.subscriber).or_default();

        if entries.iter().any(|e| e.key == key) {
            return TryCreate::AlreadyExists;
        }

        let watch_id = Uuid::now_v7();
        entries.push(WatchEntry {
            key,
            watch_id,
            state: WatchState::Active,
            created_at: Utc::now(),
        });
        TryCreate::Created(watch_id)
    }

    pub async fn get(&self, key: &WatchKey) -> Option<WatchEntry> {
        let watches = self.watches.lock().await;
        watches
            .get(&key.subscriber)
            .and_then(|entries| entries.iter().find(|e| &e.key == key))
            .cloned()
    }

    pub async fn list_by_subscriber(&self, subscriber: SubscriberId) -> Vec<WatchEntry> {
        let watches = self.watches.lock().await;
        watches.get(&subscriber).cloned().unwrap_or_default()
    }

    /// Remove the entry for `key`, returning it if it existed
    pub async fn remove(&self, key: &WatchKey) -> Option<WatchEntry> {
        let mut watches = self.watches.lock().await;
        take_entry(&mut watches, key, None)
    }

    /// Remove every watch of `subscriber`, returning their keys in insertion order
    pub async fn remove_all_for_subscriber(&self, subscriber: SubscriberId) -> Vec<WatchKey> {
        let mut watches = self.watches.lock().await;
        watches
            .remove(&subscriber)
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.key)
            .collect()
    }

    /// Complete the watch generation `watch_id` of `key`.
    ///
    /// The entry is removed and `dispatch` runs while the table is still locked,
    /// so a concurrent cancel either removes the entry first (and `dispatch`
    /// never runs) or observes it already gone. Returns whether `dispatch` ran.
    pub async fn complete<F>(&self, key: &WatchKey, watch_id: Uuid, dispatch: F) -> bool
    where
        F: FnOnce(&WatchEntry),
    {
        let mut watches = self.watches.lock().await;
        match take_entry(&mut watches, key, Some(watch_id)) {
            Some(mut entry) => {
                entry.state = WatchState::Completed;
                dispatch(&entry);
                true
            }
            None => false,
        }
    }

    /// Remove generation `watch_id` of `key` without completing it
    pub async fn discard(&self, key: &WatchKey, watch_id: Uuid) -> bool {
        let mut watches = self.watches.lock().await;
        take_entry(&mut watches, key, Some(watch_id)).is_some()
    }

    /// Total number of active watches across all subscribers
    pub async fn len(&self) -> usize {
        let watches = self.watches.lock().await;
        watches.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Remove `key` (optionally only a specific generation) from the locked table
fn take_entry(
    watches: &mut HashMap<SubscriberId, Vec<WatchEntry>>,
    key: &WatchKey,
    watch_id: Option<Uuid>,
) -> Option<WatchEntry> {
    let entries = watches.get_mut(&key.subscriber)?;
    let pos = entries
        .iter()
        .position(|e| &e.key == key && watch_id.is_none_or(|id| id == e.watch_id))?;
    let entry = entries.remove(pos);

    let duplicates = entries.iter().filter(|e| &e.key == key).count();
    if duplicates > 0 {
        tracing::error!(
            "Registry held {} duplicate entries for {}, dropping them",
            duplicates,
            key
        );
        entries.retain(|e| &e.key != key);
    }

    if entries.is_empty() {
        watches.remove(&key.subscriber);
    }
    Some(entry)
}
