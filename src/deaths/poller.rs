//! Background loop that keeps the snapshot store in step with upstream.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::metrics;

use super::client::DeathsClient;
use super::store::SnapshotStore;
use super::types::{FailurePolicy, Snapshot};

/// Run one poll and update the store. Returns whether the fetch succeeded.
pub async fn refresh_once(
    client: &DeathsClient,
    store: &SnapshotStore,
    policy: FailurePolicy,
) -> bool {
    match client.try_fetch().await {
        Ok(snapshot) => {
            metrics::inc_fetches_succeeded();
            metrics::set_snapshot_entries(snapshot.len());
            store.replace_fetched(snapshot, Utc::now()).await;
            true
        }
        Err(e) => {
            metrics::inc_fetches_failed();
            match policy {
                FailurePolicy::Clear => {
                    warn!(error = %e, "Error getting deaths, clearing snapshot");
                    metrics::set_snapshot_entries(0);
                    store.replace(Snapshot::new()).await;
                }
                FailurePolicy::KeepLast => {
                    warn!(error = %e, "Error getting deaths, keeping last snapshot");
                }
            }
            false
        }
    }
}

/// Poll forever, sleeping `interval` between polls.
pub async fn run_poller(
    client: DeathsClient,
    store: SnapshotStore,
    interval: Duration,
    policy: FailurePolicy,
) {
    info!(
        url = %client.url(),
        interval_ms = interval.as_millis() as u64,
        policy = %policy,
        "Starting death-times poller"
    );

    loop {
        refresh_once(&client, &store, policy).await;
        tokio::time::sleep(interval).await;
    }
}

/// Spawn [`run_poller`] on the runtime.
pub fn spawn_poller(
    client: DeathsClient,
    store: SnapshotStore,
    interval: Duration,
    policy: FailurePolicy,
) -> JoinHandle<()> {
    tokio::spawn(run_poller(client, store, interval, policy))
}
