//! Integration tests for the respawn board.
//!
//! These tests run a fake death-times upstream on a loopback port and drive
//! the real client, poller, store and router against it.
//! Run with: cargo test --test integration

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{TimeZone, Utc};
use chrono_tz::Europe::Moscow;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tower::ServiceExt;

use respawn_board::api::{create_router, AppState};
use respawn_board::deaths::{refresh_once, spawn_poller, DeathsClient, FailurePolicy, SnapshotStore};
use respawn_board::error::FetchError;
use respawn_board::schedule::{BoardRenderer, Mode, Presenter, TableRow};

/// What the fake upstream answers with.
#[derive(Debug, Clone)]
enum Upstream {
    Deaths(&'static str),
    ServerError,
    Garbage,
    Slow,
}

type Shared = Arc<Mutex<Upstream>>;

async fn deaths(State(shared): State<Shared>) -> Response {
    let behavior = shared.lock().unwrap().clone();
    match behavior {
        Upstream::Deaths(body) => ([("content-type", "application/json")], body).into_response(),
        Upstream::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, r#"{"Kutum":"2024-01-01 10:00:00"}"#).into_response()
        }
        Upstream::Garbage => "<html>not json</html>".into_response(),
        Upstream::Slow => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}".into_response()
        }
    }
}

/// Start a fake upstream and return its deaths URL and behavior switch.
async fn fake_upstream(initial: Upstream) -> (String, Shared) {
    let shared = Arc::new(Mutex::new(initial));
    let app = Router::new()
        .route("/api/deaths", get(deaths))
        .with_state(shared.clone());

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/deaths", addr), shared)
}

fn client(url: &str) -> DeathsClient {
    DeathsClient::new(url, Duration::from_secs(2)).unwrap()
}

const THREE_BOSSES: &str = r#"{
    "Kutum": "2024-01-01 10:00:00",
    "Nouver": "2024-01-01 08:15:00",
    "Karanda": "2024-01-01 12:45:30"
}"#;

const ONE_BROKEN: &str = r#"{
    "Kutum": "2024-01-01 10:00:00",
    "Nouver": "garbage",
    "Karanda": "2024-01-01 12:45:30",
    "Kzarka": "2024-01-01 09:00:00"
}"#;

#[tokio::test]
async fn fetch_decodes_upstream_snapshot() {
    let (url, _) = fake_upstream(Upstream::Deaths(THREE_BOSSES)).await;

    let snapshot = client(&url).try_fetch().await.unwrap();

    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot["Nouver"], "2024-01-01 08:15:00");
}

#[tokio::test]
async fn fetch_classifies_failures() {
    let (url, shared) = fake_upstream(Upstream::ServerError).await;
    let client = client(&url);

    assert!(matches!(
        client.try_fetch().await,
        Err(FetchError::Status { status: 500 })
    ));

    *shared.lock().unwrap() = Upstream::Garbage;
    assert!(matches!(client.try_fetch().await, Err(FetchError::Decode(_))));
    assert!(client.fetch().await.is_empty());
}

#[tokio::test]
async fn fetch_times_out() {
    let (url, _) = fake_upstream(Upstream::Slow).await;
    let client = DeathsClient::new(&url, Duration::from_millis(200)).unwrap();

    assert!(matches!(client.try_fetch().await, Err(FetchError::Request(_))));
}

#[tokio::test]
async fn failed_fetch_blanks_the_board() {
    let (url, shared) = fake_upstream(Upstream::Deaths(THREE_BOSSES)).await;
    let client = client(&url);
    let store = SnapshotStore::new();
    let presenter = Presenter::new(Moscow);
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap();

    assert!(refresh_once(&client, &store, FailurePolicy::Clear).await);
    assert_eq!(presenter.present(&*store.snapshot().await, Mode::Death, now).len(), 3);

    *shared.lock().unwrap() = Upstream::ServerError;
    assert!(!refresh_once(&client, &store, FailurePolicy::Clear).await);
    assert!(presenter.present(&*store.snapshot().await, Mode::Death, now).is_empty());

    *shared.lock().unwrap() = Upstream::Deaths(THREE_BOSSES);
    assert!(refresh_once(&client, &store, FailurePolicy::Clear).await);
    *shared.lock().unwrap() = Upstream::Garbage;
    assert!(!refresh_once(&client, &store, FailurePolicy::Clear).await);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn keep_last_policy_survives_upstream_outage() {
    let (url, shared) = fake_upstream(Upstream::Deaths(THREE_BOSSES)).await;
    let client = client(&url);
    let store = SnapshotStore::new();

    assert!(refresh_once(&client, &store, FailurePolicy::KeepLast).await);
    let fetched_at = store.last_success().await;

    *shared.lock().unwrap() = Upstream::ServerError;
    assert!(!refresh_once(&client, &store, FailurePolicy::KeepLast).await);

    assert_eq!(store.len().await, 3);
    assert_eq!(store.last_success().await, fetched_at);
}

#[tokio::test]
async fn poller_feeds_table_endpoint() {
    let (url, _) = fake_upstream(Upstream::Deaths(ONE_BROKEN)).await;
    let store = SnapshotStore::new();
    let poller = spawn_poller(
        client(&url),
        store.clone(),
        Duration::from_millis(50),
        FailurePolicy::Clear,
    );

    let state = AppState::new(
        store.clone(),
        Presenter::new(Moscow),
        BoardRenderer::new("Bosses", 10).unwrap(),
        concat!(env!("CARGO_MANIFEST_DIR"), "/static"),
    );
    let app = create_router(state);

    let mut waited = Duration::ZERO;
    while store.last_success().await.is_none() {
        assert!(waited < Duration::from_secs(5), "poller never succeeded");
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/table?mode=resp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let rows: Vec<TableRow> = serde_json::from_slice(&bytes).unwrap();

    let shown: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.name.as_str(), r.time.as_str()))
        .collect();
    assert_eq!(
        shown,
        vec![
            ("Kzarka", "01.01 14:00:00"),
            ("Kutum", "01.01 15:00:00"),
            ("Karanda", "01.01 17:45:30"),
        ]
    );
    assert!(rows.iter().all(|r| r.is_past && r.minutes_left < 0));

    poller.abort();
}
