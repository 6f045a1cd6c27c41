//! Application configuration loaded from environment variables.

use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::deaths::FailurePolicy;
use crate::error::Result;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Upstream ===
    /// Death-times endpoint returning `{"<boss>": "<YYYY-MM-DD HH:MM:SS>"}`.
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Timeout for one upstream request, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_s: u64,

    /// Pause between polls, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// What to do with the cached snapshot when a poll fails.
    #[serde(default)]
    pub on_fetch_failure: FailurePolicy,

    // === Presentation ===
    /// IANA zone the upstream timestamps are written in.
    #[serde(default = "default_timezone")]
    pub display_timezone: String,

    /// Page heading and title.
    #[serde(default = "default_page_title")]
    pub page_title: String,

    /// Client-side refresh period for the board page, in seconds.
    #[serde(default = "default_page_refresh")]
    pub page_refresh_seconds: u32,

    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    // === Server Configuration ===
    /// Bind address for the HTTP server.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Expose Prometheus metrics on `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_upstream_url() -> String {
    "http://192.144.59.250:5000/api/deaths".to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_timezone() -> String {
    "Europe/Moscow".to_string()
}

fn default_page_title() -> String {
    "Полевые боссы сервера Айрин".to_string()
}

fn default_page_refresh() -> u32 {
    10
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_url: default_upstream_url(),
            fetch_timeout_s: default_fetch_timeout(),
            poll_interval_ms: default_poll_interval(),
            on_fetch_failure: FailurePolicy::default(),
            display_timezone: default_timezone(),
            page_title: default_page_title(),
            page_refresh_seconds: default_page_refresh(),
            static_dir: default_static_dir(),
            host: default_host(),
            port: default_port(),
            metrics_enabled: true,
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.upstream_url.starts_with("http://") || self.upstream_url.starts_with("https://"))
        {
            return Err("UPSTREAM_URL must be an http(s) URL".to_string());
        }

        if self.fetch_timeout_s == 0 {
            return Err("FETCH_TIMEOUT_S must be positive".to_string());
        }

        if self.poll_interval_ms == 0 {
            return Err("POLL_INTERVAL_MS must be positive".to_string());
        }

        if self.page_refresh_seconds == 0 {
            return Err("PAGE_REFRESH_SECONDS must be positive".to_string());
        }

        self.timezone()?;

        Ok(())
    }

    /// Parse the display timezone.
    pub fn timezone(&self) -> std::result::Result<Tz, String> {
        self.display_timezone
            .parse::<Tz>()
            .map_err(|e| format!("DISPLAY_TIMEZONE {:?} is not an IANA zone: {}", self.display_timezone, e))
    }

    /// Log filter built from `RUST_LOG`, falling back to `info` when the
    /// directives do not parse.
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.rust_log).unwrap_or_else(|_| EnvFilter::new(default_log_level()))
    }

    /// Upstream request timeout.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_s)
    }

    /// Delay between polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.on_fetch_failure, FailurePolicy::Clear);
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Moscow);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_timezone() {
        let config = Config {
            display_timezone: "Mars/Olympus".to_string(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_upstream() {
        let config = Config {
            upstream_url: "ftp://example.com/deaths".to_string(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn failure_policy_reads_from_env_style_map() {
        let vars = vec![
            ("ON_FETCH_FAILURE".to_string(), "keep_last".to_string()),
            ("PORT".to_string(), "9000".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.on_fetch_failure, FailurePolicy::KeepLast);
        assert_eq!(config.port, 9000);
        assert_eq!(config.display_timezone, "Europe/Moscow");
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn log_filter_follows_rust_log() {
        let vars = vec![("RUST_LOG".to_string(), "respawn_board=trace,warn".to_string())];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.log_filter().max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn log_filter_falls_back_to_info() {
        let config = Config {
            rust_log: "respawn_board=loud".to_string(),
            ..Config::default()
        };

        assert_eq!(config.log_filter().max_level_hint(), Some(LevelFilter::INFO));
    }
}
