//! Flatten the summary into the shape handed to presentation.
//!
//! Spans become `[start, end]` pairs of whole epoch seconds (milliseconds
//! truncated, not rounded); an open end is `null`:
//!
//! ```json
//! { "name": "X", "existence": { "previous": [[1, 5]], "current": [10, null] } }
//! ```

use serde::{Deserialize, Serialize};

use crate::availability::{Availability, Span};
use crate::summary::Summary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceSummary {
    /// Earlier spans, oldest first.
    pub previous: Vec<(i64, i64)>,
    pub current: (i64, Option<i64>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemHistory {
    pub name: String,
    pub existence: ExistenceSummary,
}

impl ItemHistory {
    /// True when the item is still listed (its current span has no end).
    pub fn is_available(&self) -> bool {
        self.existence.current.1.is_none()
    }

    /// True when the item left the catalog at least once and came back.
    pub fn has_gaps(&self) -> bool {
        !self.existence.previous.is_empty()
    }
}

impl From<&Availability> for ExistenceSummary {
    fn from(existence: &Availability) -> Self {
        let previous = existence
            .previous()
            .iter()
            .map(|span| (to_seconds(span.since()), to_seconds(span.until())))
            .collect();
        let current = match existence.current() {
            Span::Open(open) => (to_seconds(open.since()), None),
            Span::Closed(closed) => (to_seconds(closed.since()), Some(to_seconds(closed.until()))),
        };
        Self { previous, current }
    }
}

/// Project every item, in ascending name order.
pub fn project(summary: &Summary) -> Vec<ItemHistory> {
    summary
        .iter()
        .map(|item| ItemHistory {
            name: item.name.clone(),
            existence: ExistenceSummary::from(&item.existence),
        })
        .collect()
}

fn to_seconds(millis: i64) -> i64 {
    // Integer division truncates toward zero.
    millis / 1000
}
