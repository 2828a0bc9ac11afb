//! # catalog-history
//!
//! Reconstructs the availability history of every item in a changing catalog
//! from a series of point-in-time snapshots and a set of authoritative
//! historical records.
//!
//! Each item's history is an [`Availability`]: a single open or closed span,
//! or a current span preceded by earlier disjoint spans when the item left the
//! catalog and later came back. Snapshots are folded strictly in timestamp
//! order; the result is projected into a flat, name-sorted summary.
//!
//! ## Modules
//!
//! - [`availability`]: Span types and the `concat` merge algorithm
//! - [`historical`]: Seed the summary from historical "YYYY.MM" records
//! - [`snapshot`]: Snapshot and observation model
//! - [`summary`]: Name-ordered summary mapping and its insertion rule
//! - [`reconcile`]: Sequential snapshot fold
//! - [`projection`]: Epoch-second summary shape for presentation
//! - [`error`]: Error types

pub mod availability;
pub mod error;
pub mod historical;
pub mod projection;
pub mod reconcile;
pub mod snapshot;
pub mod summary;

pub use availability::{
    Availability, ClosedAvailability, ClosedSpan, Gapped, Lifecycle, OpenAvailability, OpenSpan,
    Span,
};
pub use error::{DateField, HistoryError};
pub use historical::{parse_historical_date, seed_summary, HistoricalRecord, HISTORICAL_CUTOVER};
pub use projection::{project, ExistenceSummary, ItemHistory};
pub use reconcile::{reconcile, Reconciler, StepReport};
pub use snapshot::{snapshot_timestamp, Observation, Snapshot};
pub use summary::{ItemSummary, Summary};
