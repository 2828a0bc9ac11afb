//! Seed the summary from authoritative historical records.
//!
//! Historical records predate the snapshot collection and only carry month
//! precision: `"2019.04"` means the item was added (or removed) in April 2019.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::availability::Availability;
use crate::error::{DateField, HistoryError, Result};
use crate::summary::{ItemSummary, Summary};

/// Catalog update after which live snapshots take over from historical
/// records: 2021-06-11T00:00:00Z.
pub static HISTORICAL_CUTOVER: LazyLock<DateTime<Utc>> = LazyLock::new(|| {
    Utc.with_ymd_and_hms(2021, 6, 11, 0, 0, 0)
        .single()
        .expect("cutover is a valid UTC date")
});

static HISTORICAL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})\.(\d{2})$").expect("historical date pattern is valid"));

/// Links recorded alongside a historical entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam: Option<String>,
}

/// One entry of a historical list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub name: String,
    /// `"YYYY.MM"`
    pub added: String,
    /// `"YYYY.MM"`, absent while the item was still listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<String>,
    #[serde(default)]
    pub urls: HistoricalUrls,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HistoricalRecord {
    pub fn new(name: impl Into<String>, added: impl Into<String>, removed: Option<&str>) -> Self {
        Self {
            name: name.into(),
            added: added.into(),
            removed: removed.map(str::to_string),
            urls: HistoricalUrls::default(),
            note: None,
        }
    }

    /// The availability this record describes.
    ///
    /// # Errors
    /// Returns `HistoryError::InvalidHistoricalDate` naming the record and the
    /// malformed field, or `HistoryError::InvalidRange` if the item was
    /// removed no later than it was added.
    pub fn availability(&self) -> Result<Availability> {
        let since = self.parse_field(DateField::Added, &self.added)?;
        match &self.removed {
            None => Ok(Availability::open(since)),
            Some(removed) => {
                let until = self.parse_field(DateField::Removed, removed)?;
                Availability::closed(since, until)
            }
        }
    }

    fn parse_field(&self, field: DateField, date: &str) -> Result<i64> {
        parse_historical_date(date)
            .map(|parsed| parsed.timestamp_millis())
            .ok_or_else(|| HistoryError::InvalidHistoricalDate {
                name: self.name.clone(),
                field,
                date: date.to_string(),
            })
    }
}

/// Parse `"YYYY.MM"` into midnight UTC on the first day of that month.
///
/// Months outside 1..=12 roll over into the year: `"2021.00"` is December
/// 2020 and `"2021.13"` is January 2022. Returns `None` unless the whole
/// string matches the pattern.
pub fn parse_historical_date(value: &str) -> Option<DateTime<Utc>> {
    let captures = HISTORICAL_DATE.captures(value)?;
    let year: i32 = captures[1].parse().ok()?;
    let month: i32 = captures[2].parse().ok()?;
    let months = year * 12 + month - 1;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    NaiveDate::from_ymd_opt(months.div_euclid(12), month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

/// Build the initial summary from historical records.
///
/// Every record is stamped with the same `last_known` time and inserted in
/// order, so repeated names are merged.
///
/// # Errors
/// Stops at the first record with a malformed date.
pub fn seed_summary<'a, I>(records: I, last_known: DateTime<Utc>) -> Result<Summary>
where
    I: IntoIterator<Item = &'a HistoricalRecord>,
{
    let mut summary = Summary::new();
    for record in records {
        let existence = record.availability()?;
        summary.insert(ItemSummary::new(&record.name, last_known, existence));
    }
    tracing::debug!(items = summary.len(), "seeded summary from historical records");
    Ok(summary)
}
