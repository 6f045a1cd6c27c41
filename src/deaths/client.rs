//! HTTP client for the upstream death-times API.

use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::metrics;

use super::types::Snapshot;

/// Client for the upstream death-times endpoint.
#[derive(Debug, Clone)]
pub struct DeathsClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Full URL of the deaths endpoint.
    url: String,
}

impl DeathsClient {
    /// Create a client for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Create a client from application config.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.upstream_url.clone(), config.fetch_timeout())
    }

    /// Endpoint this client polls.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current snapshot, classifying any failure.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn try_fetch(&self) -> Result<Snapshot, FetchError> {
        let start = Instant::now();
        let result = self.request().await;
        metrics::record_fetch_latency(start);
        result
    }

    async fn request(&self) -> Result<Snapshot, FetchError> {
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let snapshot: Snapshot = serde_json::from_slice(&body)?;

        debug!(entries = snapshot.len(), "Fetched death times");

        Ok(snapshot)
    }

    /// Fetch the current snapshot, degrading to an empty one on any failure.
    pub async fn fetch(&self) -> Snapshot {
        match self.try_fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Error getting deaths");
                Snapshot::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_works() {
        let client =
            DeathsClient::new("http://127.0.0.1:5000/api/deaths", Duration::from_secs(10)).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:5000/api/deaths");
    }

    #[test]
    fn client_from_default_config_points_at_upstream() {
        let client = DeathsClient::from_config(&Config::default()).unwrap();
        assert!(client.url().ends_with("/api/deaths"));
    }

    #[tokio::test]
    async fn unreachable_upstream_degrades_to_empty() {
        // Port 9 on loopback is almost never listening.
        let client =
            DeathsClient::new("http://127.0.0.1:9/api/deaths", Duration::from_millis(500)).unwrap();

        assert!(matches!(client.try_fetch().await, Err(FetchError::Request(_))));
        assert!(client.fetch().await.is_empty());
    }
}
