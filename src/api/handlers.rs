//! HTTP API handlers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::Config;
use crate::deaths::SnapshotStore;
use crate::error::{RenderError, ServiceError};
use crate::metrics;
use crate::schedule::{BoardRenderer, DisplayEntry, Mode, Presenter};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Latest death-times snapshot.
    pub store: SnapshotStore,
    /// Board pipeline in the display zone.
    pub presenter: Presenter,
    /// Compiled page template.
    pub renderer: Arc<BoardRenderer>,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Prometheus handle, when the exporter is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        store: SnapshotStore,
        presenter: Presenter,
        renderer: BoardRenderer,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            presenter,
            renderer: Arc::new(renderer),
            static_dir: static_dir.into(),
            metrics: None,
        }
    }

    /// Build state from application config.
    pub fn from_config(config: &Config, store: SnapshotStore) -> Result<Self, ServiceError> {
        let tz = config.timezone().map_err(ServiceError::InvalidConfig)?;
        let renderer = BoardRenderer::new(config.page_title.clone(), config.page_refresh_seconds)?;
        Ok(Self::new(store, Presenter::new(tz), renderer, &config.static_dir))
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build the board from the current snapshot.
    pub async fn board(&self, mode: Mode, now: DateTime<Utc>) -> Vec<DisplayEntry> {
        let snapshot = self.store.snapshot().await;
        self.presenter.present(&snapshot, mode, now)
    }

    /// Check if at least one fetch has succeeded.
    pub async fn is_ready(&self) -> bool {
        self.store.last_success().await.is_some()
    }
}

/// Error returned to the client when a board cannot be rendered.
#[derive(Debug)]
pub struct ApiError(RenderError);

impl From<RenderError> for ApiError {
    fn from(e: RenderError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.0.to_string(),
        )
            .into_response()
    }
}

/// `mode` query parameter shared by the board endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ModeQuery {
    /// `resp` for respawn times; anything else shows death times.
    #[serde(default)]
    pub mode: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether a fetch has succeeded yet.
    pub ready: bool,
    /// Cached entries.
    pub entries: usize,
}

/// Status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Service status.
    pub status: &'static str,
    /// Cached entries.
    pub entries: usize,
    /// Time of the last successful fetch.
    pub last_success: Option<DateTime<Utc>>,
    /// Display timezone.
    pub timezone: &'static str,
}

/// Board page.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ModeQuery>,
) -> Result<Html<String>, ApiError> {
    let _timer = metrics::timer_render("index");
    let mode = Mode::from_query(query.mode.as_deref());
    let now = Utc::now();

    let entries = state.board(mode, now).await;
    let zone = state.presenter.zone_label(now);

    match state.renderer.render_page(&entries, mode, &zone) {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            error!(error = %e, "Failed to render board page");
            metrics::inc_render_failures("index");
            Err(e.into())
        }
    }
}

/// Board rows as JSON.
pub async fn table(
    State(state): State<AppState>,
    Query(query): Query<ModeQuery>,
) -> Result<Response, ApiError> {
    let _timer = metrics::timer_render("table");
    let mode = Mode::from_query(query.mode.as_deref());

    let entries = state.board(mode, Utc::now()).await;

    match state.renderer.render_table(&entries) {
        Ok(body) => Ok((
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            body,
        )
            .into_response()),
        Err(e) => {
            error!(error = %e, "Failed to render board table");
            metrics::inc_render_failures("table");
            Err(e.into())
        }
    }
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 after the first successful fetch, 503 before.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready().await;
    let response = ReadyResponse {
        ready: is_ready,
        entries: state.store.len().await,
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Status handler - returns poller status.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let last_success = state.store.last_success().await;
    let status = if last_success.is_some() { "running" } else { "starting" };

    Json(StatusResponse {
        status,
        entries: state.store.len().await,
        last_success,
        timezone: state.presenter.timezone().name(),
    })
}

/// Prometheus scrape endpoint.
pub async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
