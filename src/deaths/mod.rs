//! Death-times module for the upstream boss tracker.
//!
//! This module handles:
//! - Snapshot types shared with the presentation layer
//! - The synchronized snapshot store
//! - The upstream HTTP client
//! - The background poller that keeps the store fresh

pub mod client;
pub mod poller;
pub mod store;
pub mod types;

pub use client::DeathsClient;
pub use poller::{refresh_once, run_poller, spawn_poller};
pub use store::SnapshotStore;
pub use types::{FailurePolicy, Snapshot};
