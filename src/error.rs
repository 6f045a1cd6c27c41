//! Unified error types for the respawn board.

use thiserror::Error;

/// Unified error type for the respawn board.
///
/// Fetch failures never reach this type: the poller handles them in place.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration validation error.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Page or table rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Errors talking to the upstream death-times API.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network failure, timeout, or body read failure.
    #[error("upstream unavailable: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Body was not a JSON object of name -> timestamp strings.
    #[error("malformed upstream payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A raw death timestamp that could not be placed on the timeline.
#[derive(Error, Debug)]
pub enum TimestampError {
    /// Text is not laid out as `YYYY-MM-DD HH:MM:SS`.
    #[error("unparsable timestamp {raw:?}: expected YYYY-MM-DD HH:MM:SS")]
    Malformed {
        /// The raw value from upstream.
        raw: String,
    },

    /// Layout matched but a field is out of range, e.g. month 13.
    #[error("invalid timestamp {raw:?}: {source}")]
    Invalid {
        /// The raw value from upstream.
        raw: String,
        /// Underlying chrono error.
        source: chrono::ParseError,
    },

    /// Wall-clock time skipped by a DST transition in the display zone.
    #[error("timestamp {raw:?} does not exist in {timezone}")]
    Nonexistent {
        /// The raw value from upstream.
        raw: String,
        /// Display timezone name.
        timezone: String,
    },

    /// Instant plus the respawn offset falls outside the representable range.
    #[error("timestamp {raw:?} is out of range")]
    OutOfRange {
        /// The raw value from upstream.
        raw: String,
    },
}

/// Errors producing a response body.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Template lookup or evaluation failed.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// JSON serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
