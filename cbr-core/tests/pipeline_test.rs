//! End-to-end tests of the normalization pipeline on raw tables shaped like
//! real service responses.

use chrono::NaiveDate;
use cbr_core::{
    guess_date, normalize_data, pad, Cell, CodeMap, ColumnKey, Frame, Frequency, LevelMapping,
    NormalizeOptions, Normalized, Period, RawShape, ShapeError,
};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

fn labels(data: &Normalized) -> Vec<String> {
    let index = data.index();
    (0..index.len()).map(|i| index.label(i)).collect()
}

// ── Date parsing ─────────────────────────────────────────────────────

#[test]
fn request_dates_accept_day_or_month() {
    assert_eq!(guess_date(Some("2021-02"), "2000-01-01").unwrap(), d("2021-02-01"));
    assert_eq!(guess_date(Some("2021-02-17"), "2000-01-01").unwrap(), d("2021-02-17"));
    assert_eq!(guess_date(None, "2013-09-13").unwrap(), d("2013-09-13"));
    assert!(guess_date(Some("17.02.2021"), "2000-01-01").is_err());
}

// ── Flat responses ───────────────────────────────────────────────────

#[test]
fn key_rate_single_row() {
    let raw = Frame::from_columns(vec![
        ("DT", vec![text("2020-01-01")]),
        ("Rate", vec![Cell::Float(4.25)]),
    ])
    .unwrap();
    let options = NormalizeOptions::new(Frequency::Daily)
        .level_1(LevelMapping::codes([("Rate", "KEY_RATE")]));

    let series = normalize_data(raw, &options).unwrap().into_series().unwrap();

    assert_eq!(series.name(), Some(&ColumnKey::flat("KEY_RATE")));
    assert_eq!(series.len(), 1);
    assert_eq!(series.get(Period::day(d("2020-01-01"))), Some(&Cell::Float(4.25)));
}

#[test]
fn mapping_restricts_columns() {
    let raw = Frame::from_columns(vec![
        ("DT", vec![text("2020-01-01")]),
        ("Rate", vec![Cell::Float(4.25)]),
        ("Extra", vec![Cell::Float(1.0)]),
    ])
    .unwrap();
    let options = NormalizeOptions::default().level_1(LevelMapping::codes([("Rate", "KEY_RATE")]));

    let out = normalize_data(raw, &options).unwrap();

    assert_eq!(out.keys(), vec![ColumnKey::flat("KEY_RATE")]);
}

#[test]
fn gaps_between_observations_are_forward_filled() {
    let raw = Frame::from_columns(vec![
        ("D0", vec![text("2020-01-01"), text("2020-01-03"), text("2020-01-05")]),
        ("v", vec![text("a"), text("b"), text("c")]),
    ])
    .unwrap();

    let out = normalize_data(raw, &NormalizeOptions::default()).unwrap();

    assert_eq!(
        labels(&out),
        vec!["2020-01-01", "2020-01-02", "2020-01-03", "2020-01-04", "2020-01-05"]
    );
    let series = out.into_series().unwrap();
    assert_eq!(series.values(), &["a", "a", "b", "b", "c"].map(Cell::from));
}

#[test]
fn bookkeeping_columns_never_reach_the_output() {
    let raw = Frame::from_columns(vec![
        ("id", vec![text("ro1")]),
        ("rowOrder", vec![Cell::Int(0)]),
        ("D0", vec![text("2020-01-09T00:00:00+03:00")]),
        ("ruo", vec![Cell::Float(6.25)]),
        ("vol", vec![Cell::Float(300.5)]),
        ("DateUpdate", vec![text("2020-01-10T14:00:00+03:00")]),
    ])
    .unwrap();

    let out = normalize_data(raw, &NormalizeOptions::default()).unwrap();

    assert_eq!(out.keys(), vec![ColumnKey::flat("ruo")]);
}

#[test]
fn output_index_is_strictly_increasing() {
    let raw = Frame::from_columns(vec![
        ("DT", vec![text("2020-03-02"), text("2020-01-15"), text("2020-02-10")]),
        ("a", vec![Cell::Int(3), Cell::Int(1), Cell::Int(2)]),
        ("b", vec![Cell::Int(30), Cell::Int(10), Cell::Int(20)]),
    ])
    .unwrap();

    for period in [Frequency::Daily, Frequency::Monthly] {
        let out = normalize_data(raw.clone(), &NormalizeOptions::new(period)).unwrap();
        let periods = out.index().periods().unwrap();
        assert!(periods.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn monthly_output_keeps_month_end_values() {
    let raw = Frame::from_columns(vec![
        ("D0", vec![text("2020-01-01"), text("2020-01-20"), text("2020-03-05")]),
        ("p1", vec![Cell::Float(554.0), Cell::Float(560.0), Cell::Float(570.0)]),
        ("p2", vec![Cell::Float(1.0), Cell::Float(2.0), Cell::Float(3.0)]),
    ])
    .unwrap();
    let options = NormalizeOptions::new(Frequency::Monthly).level_1(LevelMapping::codes([
        ("p1", "TOTAL_RESERVES"),
        ("p2", "CURRENCY_RESERVES"),
    ]));

    let out = normalize_data(raw, &options).unwrap();

    assert_eq!(labels(&out), vec!["2020-01", "2020-02", "2020-03"]);
    let table = out.into_table().unwrap();
    assert_eq!(
        table.column("TOTAL_RESERVES").unwrap(),
        &[Cell::Float(560.0), Cell::Float(560.0), Cell::Float(570.0)]
    );
}

// ── Grouped responses ────────────────────────────────────────────────

#[test]
fn metals_rows_pivot_into_named_columns() {
    let date = text("2020-01-09T00:00:00+03:00");
    let raw = Frame::from_columns(vec![
        ("DateMet", vec![date.clone(), date]),
        ("CodMet", vec![Cell::Int(1), Cell::Int(2)]),
        ("price", vec![Cell::Float(5000.0), Cell::Float(60.0)]),
    ])
    .unwrap();
    let options = NormalizeOptions::default()
        .shape(RawShape::Metals)
        .level_1(LevelMapping::codes([
            ("1", "GOLD"),
            ("2", "SILVER"),
            ("3", "PLATINUM"),
            ("4", "PALLADIUM"),
        ]));

    let table = normalize_data(raw, &options).unwrap().into_table().unwrap();

    assert_eq!(table.height(), 1);
    assert_eq!(table.names(), vec!["GOLD", "SILVER"]);
    assert_eq!(table.column("GOLD").unwrap(), &[Cell::Float(5000.0)]);
    assert_eq!(table.column("SILVER").unwrap(), &[Cell::Float(60.0)]);
}

#[test]
fn repeated_group_rows_keep_the_first_value() {
    let raw = Frame::from_columns(vec![
        (
            "DateMet",
            vec![
                text("2020-01-10"),
                text("2020-01-09"),
                text("2020-01-09"),
                text("2020-01-10"),
            ],
        ),
        ("CodMet", vec![Cell::Int(1), Cell::Int(1), Cell::Int(1), Cell::Int(1)]),
        (
            "price",
            vec![
                Cell::Float(5100.0),
                Cell::Float(5000.0),
                Cell::Float(4999.0),
                Cell::Float(5101.0),
            ],
        ),
    ])
    .unwrap();
    let options = NormalizeOptions::default()
        .shape(RawShape::Metals)
        .level_1(LevelMapping::codes([("1", "GOLD")]));

    let series = normalize_data(raw, &options).unwrap().into_series().unwrap();

    assert_eq!(series.index().label(0), "2020-01-09");
    assert_eq!(series.values(), &[Cell::Float(5000.0), Cell::Float(5100.0)]);
}

#[test]
fn interbank_rows_become_two_level_columns() {
    let raw = Frame::from_columns(vec![
        ("CDate", vec![text("2020-01-09"), text("2020-01-10")]),
        ("p1", vec![Cell::Int(1), Cell::Int(1)]),
        ("d1", vec![Cell::Float(6.1), Cell::Float(6.0)]),
        ("d7", vec![Cell::Float(6.2), Cell::Float(6.1)]),
        ("d30", vec![Cell::Float(6.3), Cell::Float(6.2)]),
        ("d90", vec![Cell::Float(6.4), Cell::Float(6.3)]),
    ])
    .unwrap();
    let options = NormalizeOptions::default()
        .shape(RawShape::Interbank)
        .level_0(CodeMap::from_pairs([("1", "MIBID_RUB")]))
        .level_1(LevelMapping::codes([("d1", "D1"), ("d90", "D90")]));

    let table = normalize_data(raw, &options).unwrap().into_table().unwrap();

    assert_eq!(table.width(), 4);
    assert_eq!(
        table.get(&ColumnKey::nested("MIBID_RUB", "D90")).unwrap(),
        &[Cell::Float(6.4), Cell::Float(6.3)]
    );
    // Unmapped inner labels pass through; nested tables are never restricted.
    assert!(table.get(&ColumnKey::nested("MIBID_RUB", "d7")).is_some());
}

#[test]
fn grouped_rows_without_dates_are_a_shape_error() {
    let raw = Frame::from_columns(vec![
        ("CodMet", vec![Cell::Int(1)]),
        ("price", vec![Cell::Float(5000.0)]),
    ])
    .unwrap();
    let options = NormalizeOptions::default().shape(RawShape::Metals);
    assert_eq!(
        normalize_data(raw, &options).unwrap_err(),
        ShapeError::MissingDateColumn
    );
}

// ── Error and edge cases ─────────────────────────────────────────────

#[test]
fn duplicate_dates_are_a_shape_error() {
    let raw = Frame::from_columns(vec![
        ("DT", vec![text("2020-01-01"), text("2020-01-01T00:00:00+03:00")]),
        ("Rate", vec![Cell::Float(1.0), Cell::Float(2.0)]),
    ])
    .unwrap();
    assert!(matches!(
        normalize_data(raw, &NormalizeOptions::default()).unwrap_err(),
        ShapeError::DuplicateIndex { .. }
    ));
}

#[test]
fn table_without_date_column_cannot_be_padded() {
    let raw = Frame::from_columns(vec![("Rate", vec![Cell::Float(1.0)])]).unwrap();
    assert_eq!(
        normalize_data(raw, &NormalizeOptions::default()).unwrap_err(),
        ShapeError::MissingDateColumn
    );
}

#[test]
fn empty_response_is_an_empty_series() {
    let out = normalize_data(Frame::new(), &NormalizeOptions::default()).unwrap();
    assert!(out.is_empty());
    assert!(out.as_series().is_some());
}

#[test]
fn pad_through_explicit_end_is_idempotent() {
    let raw = Frame::from_columns(vec![
        ("DT", vec![text("2020-01-01"), text("2020-01-04")]),
        ("a", vec![Cell::Int(1), Cell::Int(4)]),
        ("b", vec![Cell::Int(10), Cell::Int(40)]),
    ])
    .unwrap();
    let data = normalize_data(raw, &NormalizeOptions::default()).unwrap();

    let once = pad(data, Frequency::Daily, Some(d("2020-01-06"))).unwrap();
    let twice = pad(once.clone(), Frequency::Daily, Some(d("2020-01-06"))).unwrap();

    assert_eq!(once.height(), 6);
    assert_eq!(once, twice);
}
