//! Point-in-time catalog listings.
//!
//! A snapshot's id is its path relative to the snapshot directory, e.g.
//! `2021/1623456789000.json`. The file stem is the capture time in epoch
//! milliseconds.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::Availability;
use crate::error::{HistoryError, Result};

/// One catalog entry as listed in a snapshot.
///
/// Only the fields the history needs are kept; everything else the catalog
/// reports is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "human-name")]
    pub name: String,
    /// Epoch seconds.
    #[serde(rename = "date-added", default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    /// Epoch seconds.
    #[serde(rename = "date-ended", default, skip_serializing_if = "Option::is_none")]
    pub date_ended: Option<i64>,
}

impl Observation {
    pub fn new(name: impl Into<String>, date_added: Option<i64>, date_ended: Option<i64>) -> Self {
        Self {
            name: name.into(),
            date_added,
            date_ended,
        }
    }

    /// The availability this observation reports on its own.
    ///
    /// `Closed` when the catalog lists an end date, `Open` otherwise. Dates
    /// are converted from seconds to milliseconds.
    ///
    /// # Errors
    /// Returns `HistoryError::MissingDateAdded` if the entry has no add date,
    /// `HistoryError::DateOutOfRange` if a date does not fit in milliseconds,
    /// or `HistoryError::InvalidRange` if it ends before it starts.
    pub fn availability(&self, snapshot_id: &str) -> Result<Availability> {
        let added = self
            .date_added
            .ok_or_else(|| HistoryError::MissingDateAdded {
                snapshot_id: snapshot_id.to_string(),
                name: self.name.clone(),
            })?;
        let since = self.to_millis(snapshot_id, "date-added", added)?;
        match self.date_ended {
            Some(ended) => {
                let until = self.to_millis(snapshot_id, "date-ended", ended)?;
                Availability::closed(since, until)
            }
            None => Ok(Availability::open(since)),
        }
    }

    fn to_millis(&self, snapshot_id: &str, field: &'static str, seconds: i64) -> Result<i64> {
        seconds
            .checked_mul(1000)
            .ok_or_else(|| HistoryError::DateOutOfRange {
                snapshot_id: snapshot_id.to_string(),
                name: self.name.clone(),
                field,
                seconds,
            })
    }
}

/// A full catalog listing captured at `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub content: Vec<Observation>,
}

impl Snapshot {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, content: Vec<Observation>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            content,
        }
    }

    /// Parse a stored snapshot, taking its timestamp from the id.
    ///
    /// # Errors
    /// Returns `HistoryError::InvalidSnapshotId` if the id's file stem is not
    /// an epoch-millisecond integer, or `HistoryError::SnapshotParse` if the
    /// text is not a JSON array of catalog entries.
    pub fn from_json(id: &str, text: &str) -> Result<Self> {
        let timestamp = snapshot_timestamp(id)?;
        let content: Vec<Observation> =
            serde_json::from_str(text).map_err(|source| HistoryError::SnapshotParse {
                id: id.to_string(),
                source,
            })?;
        Ok(Self::new(id, timestamp, content))
    }
}

/// Capture time encoded in a snapshot id.
///
/// # Errors
/// Returns `HistoryError::InvalidSnapshotId` if the file stem is not an
/// integer or is outside the representable date range.
pub fn snapshot_timestamp(id: &str) -> Result<DateTime<Utc>> {
    let invalid = || HistoryError::InvalidSnapshotId(id.to_string());
    let stem = Path::new(id)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(invalid)?;
    let millis: i64 = stem.parse().map_err(|_| invalid())?;
    DateTime::from_timestamp_millis(millis).ok_or_else(invalid)
}
