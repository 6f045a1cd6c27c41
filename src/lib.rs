//! Field boss respawn board.
//!
//! Polls an upstream tracker for the last death time of each field boss,
//! caches the snapshot in memory, and serves it as an auto-refreshing page
//! and a JSON table, either as death times or as estimated respawn times
//! (death + 5 hours).
//!
//! ```text
//! upstream /api/deaths ──poll every 1s──▶ SnapshotStore
//!                                              │
//!             GET / , /api/table ◀── Presenter (parse → offset → sort) ◀┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`deaths`]: Upstream client, snapshot store and poller
//! - [`schedule`]: Board pipeline and rendering
//! - [`api`]: HTTP surface
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod deaths;
pub mod error;
pub mod metrics;
pub mod schedule;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
