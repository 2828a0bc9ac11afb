//! Fold snapshots, in timestamp order, into the per-item summary.
//!
//! For every snapshot:
//!
//! 1. An item already in the summary but missing from the snapshot is closed at
//!    its last confirmed sighting (not at the snapshot's time: absence only
//!    proves the item was gone *by* then). Already-closed items are left alone.
//! 2. An item in both is merged with what the snapshot reports and marked as
//!    seen at the snapshot's time.
//! 3. An item only in the snapshot is inserted, seen at the snapshot's time.
//!
//! Snapshots must be applied oldest first. Out-of-order application would
//! close items at the wrong instants, so [`Reconciler::apply`] rejects it.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::availability::{Availability, Lifecycle};
use crate::error::{HistoryError, Result};
use crate::snapshot::Snapshot;
use crate::summary::{ItemSummary, Summary};

/// Counts from applying one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Items already known and listed again.
    pub confirmed: usize,
    /// Listed items that were not in the summary before this snapshot.
    pub appeared: usize,
    /// Open items missing from this snapshot, now closed.
    pub closed: usize,
}

/// Owns the summary while snapshots are folded into it.
#[derive(Debug, Clone)]
pub struct Reconciler {
    summary: Summary,
    last_applied: Option<DateTime<Utc>>,
}

impl Reconciler {
    pub fn new(seed: Summary) -> Self {
        Self {
            summary: seed,
            last_applied: None,
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn into_summary(self) -> Summary {
        self.summary
    }

    /// Timestamp of the last snapshot applied, if any.
    pub fn last_applied(&self) -> Option<DateTime<Utc>> {
        self.last_applied
    }

    /// Apply one snapshot.
    ///
    /// The step is all-or-nothing: on error the summary is left as it was.
    ///
    /// # Errors
    /// - `HistoryError::OutOfOrderSnapshot` if `snapshot` is older than the
    ///   previously applied one.
    /// - `HistoryError::MissingDateAdded` if a listed item has no add date.
    /// - `HistoryError::InvalidRange` if an item's dates yield an empty span,
    ///   either as listed or when closed at its last sighting.
    pub fn apply(&mut self, snapshot: &Snapshot) -> Result<StepReport> {
        if let Some(last_applied) = self.last_applied {
            if snapshot.timestamp < last_applied {
                return Err(HistoryError::OutOfOrderSnapshot {
                    id: snapshot.id.clone(),
                    timestamp: snapshot.timestamp,
                    last_applied,
                });
            }
        }

        // Each known item claims the first unclaimed listing with its name.
        let mut listed: HashMap<&str, VecDeque<usize>> = HashMap::new();
        for (index, observation) in snapshot.content.iter().enumerate() {
            listed.entry(observation.name.as_str()).or_default().push_back(index);
        }
        let mut claimed = vec![false; snapshot.content.len()];

        let mut next = Summary::new();
        let mut report = StepReport::default();

        for item in self.summary.iter() {
            let position = listed
                .get_mut(item.name.as_str())
                .and_then(VecDeque::pop_front);
            match position {
                Some(index) => {
                    claimed[index] = true;
                    let observed = snapshot.content[index].availability(&snapshot.id)?;
                    next.insert(ItemSummary::new(
                        &item.name,
                        snapshot.timestamp,
                        item.existence.clone().concat(observed),
                    ));
                    report.confirmed += 1;
                }
                None => {
                    let existence: Availability = match item.existence.clone().lifecycle() {
                        Lifecycle::Ongoing(open) => {
                            report.closed += 1;
                            open.set_finished(item.last_known_availability.timestamp_millis())?
                                .into()
                        }
                        Lifecycle::Ended(closed) => closed.into(),
                    };
                    next.insert(ItemSummary::new(
                        &item.name,
                        item.last_known_availability,
                        existence,
                    ));
                }
            }
        }

        for (observation, _) in snapshot
            .content
            .iter()
            .zip(&claimed)
            .filter(|(_, taken)| !**taken)
        {
            let existence = observation.availability(&snapshot.id)?;
            next.insert(ItemSummary::new(
                &observation.name,
                snapshot.timestamp,
                existence,
            ));
            report.appeared += 1;
        }

        tracing::debug!(
            snapshot = %snapshot.id,
            confirmed = report.confirmed,
            appeared = report.appeared,
            closed = report.closed,
            "applied snapshot"
        );

        self.summary = next;
        self.last_applied = Some(snapshot.timestamp);
        Ok(report)
    }
}

/// Fold `snapshots` into `seed`, in the order given.
///
/// # Errors
/// Stops at the first failing step; see [`Reconciler::apply`].
pub fn reconcile<'a, I>(seed: Summary, snapshots: I) -> Result<Summary>
where
    I: IntoIterator<Item = &'a Snapshot>,
{
    let mut reconciler = Reconciler::new(seed);
    for snapshot in snapshots {
        reconciler.apply(snapshot)?;
    }
    Ok(reconciler.into_summary())
}
