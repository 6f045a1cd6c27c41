//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{health, index, prometheus_metrics, ready, status, table, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        // Board
        .route("/", get(index))
        .route("/api/table", get(table))
        .nest_service("/static", static_files)
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Status and metrics
        .route("/api/v1/status", get(status))
        .route("/metrics", get(prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
