//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Gap filling is idempotent
//! 2. Gap filling yields a strictly increasing, contiguous index
//! 3. Every observed value survives gap filling at its own period
//! 4. Inverting twice restores a positive series
//! 5. Empty input normalizes to an empty series under any options

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use std::collections::BTreeMap;

use cbr_core::normalize::{pad_missing_periods, pad_series};
use cbr_core::{
    calculate_inverse_rate, normalize_data, Cell, CodeMap, ColumnKey, Frame, Frequency,
    LevelMapping, NormalizeOptions, Period, RawShape, RowIndex, Series,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 12, 20).unwrap()
}

/// Distinct day offsets mapped to values, in arbitrary (map) order.
fn arb_observations() -> impl Strategy<Value = BTreeMap<u64, f64>> {
    prop::collection::btree_map(0u64..120, 0.5..150.0_f64, 1..25)
}

fn dated_frame(points: &BTreeMap<u64, f64>, reversed: bool) -> Frame {
    let mut rows: Vec<(NaiveDate, f64)> = points
        .iter()
        .map(|(offset, v)| (base_date() + Days::new(*offset), *v))
        .collect();
    if reversed {
        rows.reverse();
    }
    Frame::with_index(
        RowIndex::Dates(rows.iter().map(|(d, _)| *d).collect()),
        vec![(
            ColumnKey::flat("v"),
            rows.iter().map(|(_, v)| Cell::Float(*v)).collect(),
        )],
    )
    .unwrap()
}

fn periods(frame: &Frame) -> Vec<Period> {
    frame.index().periods().unwrap().to_vec()
}

// ── 1. Idempotence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn padding_is_idempotent(points in arb_observations(), reversed in any::<bool>()) {
        let once = pad_missing_periods(dated_frame(&points, reversed), Frequency::Daily, None).unwrap();
        let twice = pad_missing_periods(once.clone(), Frequency::Daily, None).unwrap();
        prop_assert_eq!(once, twice);
    }
}

// ── 2. Contiguous increasing index ───────────────────────────────────

proptest! {
    #[test]
    fn padded_index_is_contiguous(points in arb_observations(), reversed in any::<bool>()) {
        let out = pad_missing_periods(dated_frame(&points, reversed), Frequency::Daily, None).unwrap();
        let index = periods(&out);

        for pair in index.windows(2) {
            prop_assert!(pair[0] < pair[1]);
            prop_assert_eq!(pair[0].succ(), Some(pair[1]));
        }
        let first = *points.keys().next().unwrap();
        let last = *points.keys().last().unwrap();
        prop_assert_eq!(index.len() as u64, last - first + 1);
    }
}

// ── 3. Observed values are kept, gaps carry the previous value ───────

proptest! {
    #[test]
    fn observations_survive_and_gaps_forward_fill(points in arb_observations()) {
        let out = pad_missing_periods(dated_frame(&points, false), Frequency::Daily, None).unwrap();
        let values = out.column("v").unwrap();

        let mut expected = None;
        for (period, cell) in periods(&out).iter().zip(values) {
            let offset = (period.start() - base_date()).num_days() as u64;
            if let Some(v) = points.get(&offset) {
                expected = Some(*v);
            }
            prop_assert_eq!(cell, &Cell::from(expected));
        }
    }
}

// ── 4. Inversion round trip ──────────────────────────────────────────

proptest! {
    #[test]
    fn double_inversion_restores_series(points in arb_observations()) {
        let series = Series::from_periods(
            "USDRUB.CBR",
            points
                .iter()
                .map(|(offset, v)| (Period::day(base_date() + Days::new(*offset)), Cell::Float(*v))),
        );
        let twice = calculate_inverse_rate(calculate_inverse_rate(series.clone()));

        prop_assert_eq!(twice.name(), series.name());
        for (a, b) in series.to_f64().iter().zip(twice.to_f64()) {
            let (a, b) = (a.unwrap(), b.unwrap());
            prop_assert!((a - b).abs() <= 1e-12 * a.abs());
        }
    }
}

// ── 5. Empty input ───────────────────────────────────────────────────

fn arb_options() -> impl Strategy<Value = NormalizeOptions> {
    (
        prop_oneof![Just(Frequency::Daily), Just(Frequency::Monthly)],
        prop_oneof![Just(RawShape::Flat), Just(RawShape::Metals), Just(RawShape::Interbank)],
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(period, shape, with_codes, with_outer)| {
            let mut options = NormalizeOptions::new(period).shape(shape);
            if with_codes {
                options = options.level_1(LevelMapping::codes([("Rate", "KEY_RATE")]));
            } else {
                options = options.level_1(LevelMapping::name("X"));
            }
            if with_outer {
                options = options.level_0(CodeMap::from_pairs([("1", "MIBID_RUB")]));
            }
            options
        })
}

proptest! {
    #[test]
    fn empty_input_gives_empty_series(options in arb_options()) {
        let raw = Frame::from_columns::<&str>(vec![("DT", Vec::new()), ("Rate", Vec::new())]).unwrap();
        let out = normalize_data(raw, &options).unwrap();
        prop_assert!(out.is_empty());
        prop_assert!(out.as_series().is_some());
    }
}

#[test]
fn series_padding_matches_table_padding() {
    let points: BTreeMap<u64, f64> = [(0, 1.0), (3, 2.0), (4, 3.0)].into_iter().collect();
    let table = pad_missing_periods(dated_frame(&points, false), Frequency::Daily, None).unwrap();
    let series = pad_series(
        Frame::into_series(dated_frame(&points, false), &ColumnKey::flat("v")).unwrap(),
        Frequency::Daily,
        None,
    )
    .unwrap();
    assert_eq!(series.values(), table.column("v").unwrap());
}
