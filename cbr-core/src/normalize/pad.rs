//! Gap filling: a contiguous period index with forward-filled values.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ShapeError;
use crate::frame::{Frame, RowIndex, Series};
use crate::period::{Frequency, Period};

/// Reindex `frame` onto every period between its first observation and
/// `max(last observation, end)`, carrying the latest prior row forward.
///
/// A date index is converted to periods of `freq`; a period index keeps its
/// own frequency. Rows are sorted first (stable). Only inserted periods are
/// filled: a null inside an observed row stays null. Empty input is returned
/// unchanged.
pub fn pad_missing_periods(
    frame: Frame,
    freq: Frequency,
    end: Option<NaiveDate>,
) -> Result<Frame, ShapeError> {
    if frame.is_empty() {
        return Ok(frame);
    }

    let periods: Vec<Period> = match frame.index() {
        RowIndex::Positional(_) => return Err(ShapeError::MissingDateColumn),
        RowIndex::Dates(dates) => dates.iter().map(|d| Period::new(*d, freq)).collect(),
        RowIndex::Periods(periods) => periods.clone(),
    };

    let mut order: Vec<usize> = (0..periods.len()).collect();
    order.sort_by_key(|&i| periods[i]);

    if let Some(pair) = order.windows(2).find(|w| periods[w[0]] == periods[w[1]]) {
        return Err(ShapeError::DuplicateIndex {
            period: periods[pair[0]].to_string(),
        });
    }

    let (Some(&first_row), Some(&last_row)) = (order.first(), order.last()) else {
        return Ok(frame);
    };
    let first = periods[first_row];
    let mut last = periods[last_row];
    if let Some(end) = end {
        last = last.max(Period::new(end, first.freq()));
    }

    let span = Period::range(first, last);
    let mut source = Vec::with_capacity(span.len());
    let mut cursor = 0;
    let mut current = first_row;
    for p in &span {
        while cursor < order.len() && periods[order[cursor]] <= *p {
            current = order[cursor];
            cursor += 1;
        }
        source.push(current);
    }

    debug!(
        observed = periods.len(),
        padded = span.len(),
        freq = %first.freq(),
        "filled missing periods"
    );
    frame.take_rows(RowIndex::Periods(span), &source)
}

/// [`pad_missing_periods`] for a single series; the name is kept as is.
pub fn pad_series(
    series: Series,
    freq: Frequency,
    end: Option<NaiveDate>,
) -> Result<Series, ShapeError> {
    let name = series.name().cloned();
    let padded = pad_missing_periods(series.into_frame(), freq, end)?;
    Ok(Series::from_frame_column(padded, name))
}
