//! Board types derived from the cached snapshot.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which instant the board shows for each boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Default)]
pub enum Mode {
    /// Last known time of death.
    #[strum(to_string = "death")]
    #[default]
    Death,
    /// Estimated respawn: time of death plus the respawn offset.
    #[strum(to_string = "resp", serialize = "respawn")]
    Respawn,
}

impl Mode {
    /// Mode selected by the `mode` query parameter; anything unrecognised
    /// falls back to [`Mode::Death`].
    pub fn from_query(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Whether respawn times are shown.
    pub fn is_respawn(&self) -> bool {
        matches!(self, Mode::Respawn)
    }
}

/// One boss on the board. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    /// Boss name.
    pub name: String,
    /// Death or respawn instant in the display zone.
    pub time: DateTime<Tz>,
    /// Whole minutes until `time`, truncated toward zero; negative once past.
    pub minutes_left: i64,
    /// `minutes_left < 0`.
    pub is_past: bool,
}

/// Serialized board row, as returned by `/api/table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Boss name.
    pub name: String,
    /// `DD.MM HH:MM:SS` in the display zone.
    pub time: String,
    /// Whole minutes until `time`.
    pub minutes_left: i64,
    /// Whether `time` has already passed.
    pub is_past: bool,
}
