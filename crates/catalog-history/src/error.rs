//! Error types for catalog-history operations.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Which date of a historical record failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Added,
    Removed,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateField::Added => f.write_str("added"),
            DateField::Removed => f.write_str("removed"),
        }
    }
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("invalid range: \"since\" ({since}) has to be smaller than \"until\" ({until})")]
    InvalidRange { since: i64, until: i64 },

    #[error("gapped availability needs at least one previous span")]
    EmptyGap,

    #[error("invalid {field} date {date:?} for historical record {name:?}")]
    InvalidHistoricalDate {
        name: String,
        field: DateField,
        date: String,
    },

    #[error("item {name:?} in snapshot {snapshot_id} has no date-added")]
    MissingDateAdded { snapshot_id: String, name: String },

    #[error("item {name:?} in snapshot {snapshot_id} has {field} {seconds}, outside the representable range")]
    DateOutOfRange {
        snapshot_id: String,
        name: String,
        field: &'static str,
        seconds: i64,
    },

    #[error("snapshot id {0:?} does not name an epoch-millisecond timestamp")]
    InvalidSnapshotId(String),

    #[error("snapshot {id} could not be parsed: {source}")]
    SnapshotParse {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot {id} at {timestamp} is older than the last applied snapshot at {last_applied}")]
    OutOfOrderSnapshot {
        id: String,
        timestamp: DateTime<Utc>,
        last_applied: DateTime<Utc>,
    },
}

pub type Result<T> = std::result::Result<T, HistoryError>;
