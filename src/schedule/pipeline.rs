//! Parse, offset and order cached death times for display.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::deaths::Snapshot;
use crate::error::TimestampError;
use crate::metrics;

use super::types::{DisplayEntry, Mode};

/// Format of upstream death timestamps.
pub const DEATH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of times shown on the board.
pub const DISPLAY_TIME_FORMAT: &str = "%d.%m %H:%M:%S";

/// Hours between a boss's death and its respawn.
pub const RESPAWN_OFFSET_HOURS: i64 = 5;

/// Builds board entries from a snapshot in a fixed display zone.
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    tz: Tz,
}

impl Presenter {
    /// Create a presenter reading timestamps as wall-clock time in `tz`.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Display zone.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Zone abbreviation in effect at `now`, e.g. `MSK`.
    pub fn zone_label(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.tz).format("%Z").to_string()
    }

    /// Parse an upstream timestamp as local time in the display zone.
    ///
    /// Only the exact `YYYY-MM-DD HH:MM:SS` layout is accepted. Times skipped
    /// by a DST jump are rejected; repeated ones resolve to the earlier
    /// instant.
    pub fn parse_death_time(&self, raw: &str) -> Result<DateTime<Tz>, TimestampError> {
        if !has_death_time_layout(raw) {
            return Err(TimestampError::Malformed {
                raw: raw.to_string(),
            });
        }

        let naive = NaiveDateTime::parse_from_str(raw, DEATH_TIME_FORMAT).map_err(|source| {
            TimestampError::Invalid {
                raw: raw.to_string(),
                source,
            }
        })?;

        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| TimestampError::Nonexistent {
                raw: raw.to_string(),
                timezone: self.tz.name().to_string(),
            })
    }

    /// Instant shown for a death time in `mode`.
    fn effective_time(&self, raw: &str, mode: Mode) -> Result<DateTime<Tz>, TimestampError> {
        let died_at = self.parse_death_time(raw)?;
        match mode {
            Mode::Death => Ok(died_at),
            Mode::Respawn => respawn_time(died_at).ok_or_else(|| TimestampError::OutOfRange {
                raw: raw.to_string(),
            }),
        }
    }

    /// Build the board for `mode` as of `now`, ordered by displayed time.
    ///
    /// Entries whose timestamp does not parse, or whose respawn time cannot be
    /// represented, are logged and left out.
    pub fn present(&self, snapshot: &Snapshot, mode: Mode, now: DateTime<Utc>) -> Vec<DisplayEntry> {
        let mut entries: Vec<DisplayEntry> = snapshot
            .iter()
            .filter_map(|(name, raw)| {
                let time = match self.effective_time(raw, mode) {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(boss = %name, error = %e, "Dropping death time");
                        metrics::inc_timestamps_dropped();
                        return None;
                    }
                };

                let minutes_left = minutes_until(now, &time);

                Some(DisplayEntry {
                    name: name.clone(),
                    time,
                    minutes_left,
                    is_past: minutes_left < 0,
                })
            })
            .collect();

        entries.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.name.cmp(&b.name)));
        entries
    }
}

/// `YYYY-MM-DD HH:MM:SS` with zero-padded fields and a four-digit year.
fn has_death_time_layout(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 19
        && bytes.iter().enumerate().all(|(i, &b)| match i {
            4 | 7 => b == b'-',
            10 => b == b' ',
            13 | 16 => b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Respawn instant for a death at `died_at`, if representable.
fn respawn_time(died_at: DateTime<Tz>) -> Option<DateTime<Tz>> {
    died_at.checked_add_signed(Duration::hours(RESPAWN_OFFSET_HOURS))
}

/// Whole minutes from `now` to `at`, truncated toward zero.
pub fn minutes_until(now: DateTime<Utc>, at: &DateTime<Tz>) -> i64 {
    (at.with_timezone(&Utc) - now).num_minutes()
}
