//! Property-based tests for `concat` using proptest.
//!
//! Records are built by folding random spans through `concat`, so every input
//! is a value the merge itself can produce.

use catalog_history::availability::{Availability, Span};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A single open or closed span inside a small window, so overlaps, touches
/// and gaps all show up often.
fn arb_simple() -> impl Strategy<Value = Availability> {
    prop_oneof![
        (0i64..100).prop_map(Availability::open),
        (0i64..100, 1i64..20)
            .prop_map(|(since, length)| Availability::closed(since, since + length).unwrap()),
    ]
}

/// Any availability reachable by merging a few simple spans.
fn arb_availability() -> impl Strategy<Value = Availability> {
    prop::collection::vec(arb_simple(), 1..6).prop_map(|spans| {
        spans
            .into_iter()
            .reduce(Availability::concat)
            .expect("at least one span")
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 512,
        ..ProptestConfig::default()
    }
}

/// Instants probed for coverage; a little past the generated window.
fn probe() -> impl Iterator<Item = i64> {
    -5i64..130
}

fn assert_well_formed(existence: &Availability) -> Result<(), TestCaseError> {
    let spans = existence.spans();
    for window in spans.windows(2) {
        let earlier = window[0];
        let later = window[1];
        let earlier_end = earlier.until();
        prop_assert!(
            earlier_end.is_some(),
            "only the current span may be open: {:?}",
            existence
        );
        prop_assert!(
            earlier_end.unwrap_or(i64::MAX) < later.since(),
            "spans must be ordered with a real gap: {:?}",
            existence
        );
    }
    if let Some(Span::Closed(closed)) = spans.last() {
        prop_assert!(closed.since() < closed.until());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Property 1: concat covers exactly the union of its inputs
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn concat_covers_union(a in arb_availability(), b in arb_availability()) {
        let merged = a.clone().concat(b.clone());
        for instant in probe() {
            prop_assert_eq!(
                merged.covers(instant),
                a.covers(instant) || b.covers(instant),
                "instant {} in {:?} ⊕ {:?} = {:?}",
                instant,
                a,
                b,
                merged
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: coverage does not depend on argument order
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn concat_coverage_is_commutative(a in arb_availability(), b in arb_availability()) {
        let ab = a.clone().concat(b.clone());
        let ba = b.concat(a);
        for instant in probe() {
            prop_assert_eq!(ab.covers(instant), ba.covers(instant));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: merged records stay ordered, disjoint and non-adjacent
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn concat_keeps_spans_ordered_and_gapped(a in arb_availability(), b in arb_availability()) {
        assert_well_formed(&a)?;
        assert_well_formed(&b)?;
        assert_well_formed(&a.concat(b))?;
    }
}

// ---------------------------------------------------------------------------
// Property 4: merging a record with itself changes nothing
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn concat_with_self_is_identity(a in arb_availability()) {
        prop_assert_eq!(a.clone().concat(a.clone()), a);
    }
}
