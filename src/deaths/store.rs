//! Process-wide cache of the latest death-times snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::types::Snapshot;

#[derive(Debug, Default)]
struct StoreState {
    entries: Arc<Snapshot>,
    last_success: Option<DateTime<Utc>>,
}

/// Shared snapshot cache.
///
/// Writers swap in a whole new map; readers get an `Arc` to the map that was
/// current when they asked and never observe a half-written one.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    state: Arc<RwLock<StoreState>>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached snapshot wholesale.
    pub async fn replace(&self, snapshot: Snapshot) {
        self.state.write().await.entries = Arc::new(snapshot);
    }

    /// Replace the cached snapshot and record it as a successful fetch.
    pub async fn replace_fetched(&self, snapshot: Snapshot, at: DateTime<Utc>) {
        let mut state = self.state.write().await;
        state.entries = Arc::new(snapshot);
        state.last_success = Some(at);
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.state.read().await.entries.clone()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Time of the last successful fetch, if any.
    pub async fn last_success(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_success
    }
}
