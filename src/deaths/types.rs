//! Types describing what the upstream tracker reports.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Boss name -> raw death timestamp (`YYYY-MM-DD HH:MM:SS`), as last fetched.
pub type Snapshot = HashMap<String, String>;

/// How a failed poll affects the cached snapshot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailurePolicy {
    /// Replace the snapshot with an empty one; the board goes blank until
    /// the next successful poll.
    #[default]
    Clear,
    /// Keep serving the last snapshot that was fetched successfully.
    KeepLast,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn failure_policy_round_trips_through_strings() {
        assert_eq!(FailurePolicy::from_str("clear").unwrap(), FailurePolicy::Clear);
        assert_eq!(FailurePolicy::from_str("keep_last").unwrap(), FailurePolicy::KeepLast);
        assert_eq!(FailurePolicy::KeepLast.to_string(), "keep_last");
        assert!(FailurePolicy::from_str("retry").is_err());
    }
}
