//! Benchmarks for the snapshot fold and `concat`.
//!
//! Run with `cargo bench -p catalog-history`.

use std::hint::black_box;

use catalog_history::{reconcile, Availability, Observation, Snapshot, Summary};
use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

/// A catalog of `items` entries observed weekly; every third item drops out
/// for a week now and then, so histories pick up gaps.
fn weekly_snapshots(items: usize, weeks: i64) -> Vec<Snapshot> {
    let start = 1_600_000_000i64;
    (0..weeks)
        .map(|week| {
            let taken = start + week * 7 * 86_400;
            let content = (0..items)
                .filter(|item| item % 3 != 0 || (week + *item as i64) % 5 != 0)
                .map(|item| {
                    // Items that come and go report a fresh add date each time.
                    let added = if item % 3 == 0 { taken - 3_600 } else { start - item as i64 };
                    Observation::new(format!("Item {item:04}"), Some(added), None)
                })
                .collect();
            Snapshot::new(
                format!("{}.json", taken * 1000),
                Utc.timestamp_opt(taken, 0).unwrap(),
                content,
            )
        })
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let snapshots = weekly_snapshots(1_000, 52);
    c.bench_function("reconcile 1000 items x 52 snapshots", |b| {
        b.iter(|| reconcile(Summary::new(), black_box(&snapshots)).unwrap())
    });
}

fn bench_concat(c: &mut Criterion) {
    let history = (0..200i64).fold(Availability::open(1_000_000), |acc, i| {
        acc.concat(Availability::closed(i * 100, i * 100 + 50).unwrap())
    });
    c.bench_function("concat span into 200-chunk history", |b| {
        b.iter(|| {
            black_box(history.clone()).concat(black_box(Availability::closed(5_025, 5_075).unwrap()))
        })
    });
}

criterion_group!(benches, bench_reconcile, bench_concat);
criterion_main!(benches);
