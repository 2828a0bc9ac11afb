//! Tests for historical date parsing and summary seeding.

use catalog_history::{
    parse_historical_date, seed_summary, Availability, DateField, HistoricalRecord, HistoryError,
    HISTORICAL_CUTOVER,
};
use chrono::{TimeZone, Utc};

fn month_start(year: i32, month: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .unwrap()
        .timestamp_millis()
}

// ── parse_historical_date ───────────────────────────────────────────────────

#[test]
fn parses_year_and_month_to_first_of_month() {
    let parsed = parse_historical_date("2019.04").unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2019, 4, 1, 0, 0, 0).unwrap());

    let parsed = parse_historical_date("2020.12").unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2020, 12, 1, 0, 0, 0).unwrap());
}

#[test]
fn rejects_malformed_dates() {
    for value in ["", "2019", "2019-04", "19.04", "2019.4", "2019.04.01", "x2019.04", "2019.04 "] {
        assert!(
            parse_historical_date(value).is_none(),
            "{value:?} should not parse"
        );
    }
}

#[test]
fn out_of_range_months_roll_over_into_the_year() {
    assert_eq!(
        parse_historical_date("2021.00").unwrap(),
        Utc.with_ymd_and_hms(2020, 12, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(
        parse_historical_date("2021.13").unwrap(),
        Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(
        parse_historical_date("2021.99").unwrap(),
        Utc.with_ymd_and_hms(2029, 3, 1, 0, 0, 0).unwrap()
    );
}

#[test]
fn record_with_rolled_over_month_is_valid() {
    let record = HistoricalRecord::new("X", "2021.00", Some("2021.13"));
    assert_eq!(
        record.availability().unwrap(),
        Availability::closed(month_start(2020, 12), month_start(2022, 1)).unwrap()
    );
}

#[test]
fn cutover_is_june_2021_update() {
    assert_eq!(
        *HISTORICAL_CUTOVER,
        Utc.with_ymd_and_hms(2021, 6, 11, 0, 0, 0).unwrap()
    );
}

// ── HistoricalRecord ────────────────────────────────────────────────────────

#[test]
fn record_without_removal_is_open() {
    let record = HistoricalRecord::new("Alpha", "2018.02", None);
    assert_eq!(
        record.availability().unwrap(),
        Availability::open(month_start(2018, 2))
    );
}

#[test]
fn record_with_removal_is_closed() {
    let record = HistoricalRecord::new("Beta", "2018.02", Some("2020.07"));
    assert_eq!(
        record.availability().unwrap(),
        Availability::closed(month_start(2018, 2), month_start(2020, 7)).unwrap()
    );
}

#[test]
fn record_removed_in_same_month_is_invalid_range() {
    let record = HistoricalRecord::new("Gamma", "2018.02", Some("2018.02"));
    assert!(matches!(
        record.availability().unwrap_err(),
        HistoryError::InvalidRange { .. }
    ));
}

#[test]
fn deserializes_historical_list() {
    let json = r#"[
        {"name": "Alpha", "added": "2018.02", "urls": {"steam": "https://store.example/1"}},
        {"name": "Beta", "added": "2018.02", "removed": "2020.07", "urls": {}, "note": "delisted"}
    ]"#;
    let records: Vec<HistoricalRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].removed, None);
    assert_eq!(records[0].urls.steam.as_deref(), Some("https://store.example/1"));
    assert_eq!(records[1].removed.as_deref(), Some("2020.07"));
    assert_eq!(records[1].note.as_deref(), Some("delisted"));
}

// ── seed_summary ────────────────────────────────────────────────────────────

#[test]
fn seed_stamps_every_item_with_cutover() {
    let records = vec![
        HistoricalRecord::new("Beta", "2018.02", Some("2020.07")),
        HistoricalRecord::new("Alpha", "2019.01", None),
    ];
    let summary = seed_summary(&records, *HISTORICAL_CUTOVER).unwrap();

    assert_eq!(summary.len(), 2);
    let names: Vec<&str> = summary.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
    for item in summary.iter() {
        assert_eq!(item.last_known_availability, *HISTORICAL_CUTOVER);
    }
}

#[test]
fn seed_merges_repeated_names() {
    let records = vec![
        HistoricalRecord::new("Alpha", "2018.01", Some("2018.06")),
        HistoricalRecord::new("Alpha", "2019.01", None),
    ];
    let summary = seed_summary(&records, *HISTORICAL_CUTOVER).unwrap();

    assert_eq!(summary.len(), 1);
    let alpha = summary.get("Alpha").unwrap();
    assert_eq!(alpha.existence.previous().len(), 1);
    assert_eq!(alpha.existence.current().since(), month_start(2019, 1));
    assert!(alpha.existence.is_open());
}

#[test]
fn seed_reports_malformed_added_date() {
    let records = vec![
        HistoricalRecord::new("Alpha", "2018.01", None),
        HistoricalRecord::new("Broken", "Jan 2018", None),
    ];
    match seed_summary(&records, *HISTORICAL_CUTOVER).unwrap_err() {
        HistoryError::InvalidHistoricalDate { name, field, date } => {
            assert_eq!(name, "Broken");
            assert_eq!(field, DateField::Added);
            assert_eq!(date, "Jan 2018");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn seed_reports_malformed_removed_date() {
    let records = vec![HistoricalRecord::new("Broken", "2018.01", Some("2018/06"))];
    let err = seed_summary(&records, *HISTORICAL_CUTOVER).unwrap_err();
    assert!(matches!(
        err,
        HistoryError::InvalidHistoricalDate {
            field: DateField::Removed,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        r#"invalid removed date "2018/06" for historical record "Broken""#
    );
}
