//! Availability spans and the `concat` merge algorithm.
//!
//! An [`Availability`] is everything known about when one catalog item was
//! present: a single [`OpenSpan`] or [`ClosedSpan`], or a current span preceded
//! by one or more earlier disjoint closed spans ("gaps" in the history).
//!
//! All instants are milliseconds since the Unix epoch.
//!
//! Merging uses two slightly different boundary rules:
//!
//! - open vs. closed: the spans collapse when `closed.until >= open.since`
//!   (exact adjacency counts as continuous presence);
//! - closed vs. closed: the spans collapse when they overlap or touch
//!   (`a.since <= b.until && b.since <= a.until`).

use std::cmp::Ordering;
use std::iter;

use crate::error::{HistoryError, Result};

/// Continuously available since `since`, no known end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpenSpan {
    since: i64,
}

impl OpenSpan {
    pub fn new(since: i64) -> Self {
        Self { since }
    }

    pub fn since(&self) -> i64 {
        self.since
    }

    /// Close this span at `until`.
    ///
    /// # Errors
    /// Returns `HistoryError::InvalidRange` if `until <= since`.
    pub fn set_finished(self, until: i64) -> Result<ClosedSpan> {
        ClosedSpan::new(self.since, until)
    }
}

/// Available during `[since, until]`, with `since < until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClosedSpan {
    since: i64,
    until: i64,
}

impl ClosedSpan {
    /// Build a closed span.
    ///
    /// # Errors
    /// Returns `HistoryError::InvalidRange` if `since >= until`.
    pub fn new(since: i64, until: i64) -> Result<Self> {
        if since >= until {
            return Err(HistoryError::InvalidRange { since, until });
        }
        Ok(Self { since, until })
    }

    pub fn since(&self) -> i64 {
        self.since
    }

    pub fn until(&self) -> i64 {
        self.until
    }

    /// True when the two spans overlap or share an endpoint.
    fn touches(&self, other: &ClosedSpan) -> bool {
        self.since <= other.until && other.since <= self.until
    }
}

/// A single contiguous span, open or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Span {
    Open(OpenSpan),
    Closed(ClosedSpan),
}

impl Span {
    pub fn since(&self) -> i64 {
        match self {
            Span::Open(open) => open.since,
            Span::Closed(closed) => closed.since,
        }
    }

    /// End of the span, `None` while still open.
    pub fn until(&self) -> Option<i64> {
        match self {
            Span::Open(_) => None,
            Span::Closed(closed) => Some(closed.until),
        }
    }

    pub fn covers(&self, instant: i64) -> bool {
        match self {
            Span::Open(open) => open.since <= instant,
            Span::Closed(closed) => closed.since <= instant && instant <= closed.until,
        }
    }
}

/// A current span preceded by earlier, disjoint closed spans (oldest first).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gapped<C> {
    previous: Vec<ClosedSpan>,
    current: C,
}

impl<C> Gapped<C> {
    /// # Errors
    /// Returns `HistoryError::EmptyGap` if `previous` is empty.
    pub fn new(previous: Vec<ClosedSpan>, current: C) -> Result<Self> {
        if previous.is_empty() {
            return Err(HistoryError::EmptyGap);
        }
        Ok(Self { previous, current })
    }

    /// The earlier spans, never empty.
    pub fn previous(&self) -> &[ClosedSpan] {
        &self.previous
    }

    pub fn current(&self) -> &C {
        &self.current
    }

    pub fn into_parts(self) -> (Vec<ClosedSpan>, C) {
        (self.previous, self.current)
    }
}

/// The known availability of one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Availability {
    Open(OpenSpan),
    Closed(ClosedSpan),
    GappedOpen(Gapped<OpenSpan>),
    GappedClosed(Gapped<ClosedSpan>),
}

/// An availability whose latest span is still open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAvailability {
    Open(OpenSpan),
    GappedOpen(Gapped<OpenSpan>),
}

/// An availability whose latest span has ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosedAvailability {
    Closed(ClosedSpan),
    GappedClosed(Gapped<ClosedSpan>),
}

/// An availability split by whether its latest span is still open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Ongoing(OpenAvailability),
    Ended(ClosedAvailability),
}

impl OpenAvailability {
    /// Close the current span at `until`, keeping any earlier spans.
    ///
    /// Only defined for open records; a closed record has no
    /// `set_finished`.
    ///
    /// # Errors
    /// Returns `HistoryError::InvalidRange` if `until` is not after the
    /// current span's start.
    pub fn set_finished(self, until: i64) -> Result<ClosedAvailability> {
        match self {
            OpenAvailability::Open(open) => Ok(ClosedAvailability::Closed(open.set_finished(until)?)),
            OpenAvailability::GappedOpen(Gapped { previous, current }) => {
                Ok(ClosedAvailability::GappedClosed(Gapped {
                    previous,
                    current: current.set_finished(until)?,
                }))
            }
        }
    }
}

impl From<OpenAvailability> for Availability {
    fn from(value: OpenAvailability) -> Self {
        match value {
            OpenAvailability::Open(open) => Availability::Open(open),
            OpenAvailability::GappedOpen(gapped) => Availability::GappedOpen(gapped),
        }
    }
}

impl From<ClosedAvailability> for Availability {
    fn from(value: ClosedAvailability) -> Self {
        match value {
            ClosedAvailability::Closed(closed) => Availability::Closed(closed),
            ClosedAvailability::GappedClosed(gapped) => Availability::GappedClosed(gapped),
        }
    }
}

impl From<Span> for Availability {
    fn from(span: Span) -> Self {
        match span {
            Span::Open(open) => Availability::Open(open),
            Span::Closed(closed) => Availability::Closed(closed),
        }
    }
}

impl From<OpenSpan> for Availability {
    fn from(open: OpenSpan) -> Self {
        Availability::Open(open)
    }
}

impl From<ClosedSpan> for Availability {
    fn from(closed: ClosedSpan) -> Self {
        Availability::Closed(closed)
    }
}

/// An availability taken apart for merging.
enum Parts {
    Simple(Span),
    Chunked {
        previous: Vec<ClosedSpan>,
        current: Span,
    },
}

impl Availability {
    pub fn open(since: i64) -> Self {
        Availability::Open(OpenSpan::new(since))
    }

    /// # Errors
    /// Returns `HistoryError::InvalidRange` if `since >= until`.
    pub fn closed(since: i64, until: i64) -> Result<Self> {
        ClosedSpan::new(since, until).map(Availability::Closed)
    }

    /// Merge two records of the same item into their union.
    ///
    /// Overlapping or adjacent spans collapse; disjoint spans end up in the
    /// `previous` list in the order the merge discovers them, which is
    /// chronological as long as records are combined in chronological order.
    pub fn concat(self, other: Availability) -> Availability {
        match (self.into_parts(), other.into_parts()) {
            (Parts::Simple(a), Parts::Simple(b)) => merge_spans(a, b),
            (Parts::Simple(span), Parts::Chunked { previous, current })
            | (Parts::Chunked { previous, current }, Parts::Simple(span)) => {
                merge_into_chunks(span, previous, current)
            }
            (Parts::Chunked { previous, current }, chunked @ Parts::Chunked { .. }) => previous
                .into_iter()
                .map(Span::Closed)
                .chain(iter::once(current))
                .fold(Availability::from_parts(chunked), |merged, span| {
                    Availability::from(span).concat(merged)
                }),
        }
    }

    /// Split by whether the latest span is still open.
    pub fn lifecycle(self) -> Lifecycle {
        match self {
            Availability::Open(open) => Lifecycle::Ongoing(OpenAvailability::Open(open)),
            Availability::GappedOpen(gapped) => {
                Lifecycle::Ongoing(OpenAvailability::GappedOpen(gapped))
            }
            Availability::Closed(closed) => Lifecycle::Ended(ClosedAvailability::Closed(closed)),
            Availability::GappedClosed(gapped) => {
                Lifecycle::Ended(ClosedAvailability::GappedClosed(gapped))
            }
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Availability::Open(_) | Availability::GappedOpen(_))
    }

    /// The latest span.
    pub fn current(&self) -> Span {
        match self {
            Availability::Open(open) => Span::Open(*open),
            Availability::Closed(closed) => Span::Closed(*closed),
            Availability::GappedOpen(gapped) => Span::Open(gapped.current),
            Availability::GappedClosed(gapped) => Span::Closed(gapped.current),
        }
    }

    /// Earlier disjoint spans, empty for an ungapped record.
    pub fn previous(&self) -> &[ClosedSpan] {
        match self {
            Availability::Open(_) | Availability::Closed(_) => &[],
            Availability::GappedOpen(gapped) => &gapped.previous,
            Availability::GappedClosed(gapped) => &gapped.previous,
        }
    }

    /// All spans, `previous` first, current last.
    pub fn spans(&self) -> Vec<Span> {
        self.previous()
            .iter()
            .copied()
            .map(Span::Closed)
            .chain(iter::once(self.current()))
            .collect()
    }

    /// True when `instant` falls within any span of this record.
    pub fn covers(&self, instant: i64) -> bool {
        self.spans().iter().any(|span| span.covers(instant))
    }

    fn into_parts(self) -> Parts {
        match self {
            Availability::Open(open) => Parts::Simple(Span::Open(open)),
            Availability::Closed(closed) => Parts::Simple(Span::Closed(closed)),
            Availability::GappedOpen(Gapped { previous, current }) => Parts::Chunked {
                previous,
                current: Span::Open(current),
            },
            Availability::GappedClosed(Gapped { previous, current }) => Parts::Chunked {
                previous,
                current: Span::Closed(current),
            },
        }
    }

    fn from_parts(parts: Parts) -> Self {
        match parts {
            Parts::Simple(span) => Availability::from(span),
            Parts::Chunked { previous, current } => Availability::with_previous(previous, current),
        }
    }

    /// Attach `previous` to `current`, staying ungapped when there is none.
    fn with_previous(previous: Vec<ClosedSpan>, current: Span) -> Self {
        if previous.is_empty() {
            return Availability::from(current);
        }
        match current {
            Span::Open(current) => Availability::GappedOpen(Gapped { previous, current }),
            Span::Closed(current) => Availability::GappedClosed(Gapped { previous, current }),
        }
    }
}

fn merge_spans(a: Span, b: Span) -> Availability {
    match (a, b) {
        (Span::Open(a), Span::Open(b)) => Availability::open(a.since.min(b.since)),
        (Span::Open(open), Span::Closed(closed)) | (Span::Closed(closed), Span::Open(open)) => {
            merge_open_closed(open, closed)
        }
        (Span::Closed(a), Span::Closed(b)) => merge_closed(a, b),
    }
}

fn merge_open_closed(open: OpenSpan, closed: ClosedSpan) -> Availability {
    match closed.until.cmp(&open.since) {
        Ordering::Less => Availability::GappedOpen(Gapped {
            previous: vec![closed],
            current: open,
        }),
        Ordering::Equal => Availability::open(closed.since),
        Ordering::Greater => Availability::open(open.since.min(closed.since)),
    }
}

fn merge_closed(a: ClosedSpan, b: ClosedSpan) -> Availability {
    if a.touches(&b) {
        return Availability::Closed(ClosedSpan {
            since: a.since.min(b.since),
            until: a.until.max(b.until),
        });
    }
    let (earlier, later) = if a.since < b.since { (a, b) } else { (b, a) };
    Availability::GappedClosed(Gapped {
        previous: vec![earlier],
        current: later,
    })
}

/// Fold `span` through every span of a gapped record, oldest first.
///
/// Spans that stay disjoint from the running merge are collected into the new
/// `previous` list; the running merge becomes the new `current`.
fn merge_into_chunks(span: Span, previous: Vec<ClosedSpan>, current: Span) -> Availability {
    let mut gaps = Vec::with_capacity(previous.len() + 1);
    let mut running = span;
    for range in previous.into_iter().map(Span::Closed).chain(iter::once(current)) {
        match merge_spans(running, range).into_parts() {
            Parts::Simple(merged) => running = merged,
            Parts::Chunked {
                previous: mut found,
                current: merged,
            } => {
                gaps.append(&mut found);
                running = merged;
            }
        }
    }
    Availability::with_previous(gaps, running)
}
