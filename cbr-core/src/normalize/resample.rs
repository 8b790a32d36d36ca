//! Downsampling of a period-indexed table.

use tracing::debug;

use crate::error::ShapeError;
use crate::frame::{Cell, Frame, RowIndex};
use crate::period::{Frequency, Period};

/// Regroup rows into periods of `freq`, keeping the last non-null value of
/// each column within each period.
///
/// The result covers every period from the first row's to the last row's,
/// so a bucket with no observation is null. Rows must already be sorted, as
/// gap filling leaves them. Empty input passes through.
pub fn resample_last(frame: Frame, freq: Frequency) -> Result<Frame, ShapeError> {
    if frame.is_empty() {
        return Ok(frame);
    }

    let buckets: Vec<Period> = (0..frame.height())
        .map(|i| frame.index().date(i).map(|d| Period::new(d, freq)))
        .collect::<Option<_>>()
        .ok_or(ShapeError::MissingDateColumn)?;

    let (Some(&first), Some(&last)) = (buckets.iter().min(), buckets.iter().max()) else {
        return Ok(frame);
    };
    let span = Period::range(first, last);

    let index_name = frame.index_name().map(str::to_string);
    let (_, _, columns) = frame.into_parts();
    let columns = columns
        .into_iter()
        .map(|(key, cells)| {
            let mut out = vec![Cell::Null; span.len()];
            for (cell, bucket) in cells.into_iter().zip(&buckets) {
                if cell.is_null() {
                    continue;
                }
                if let Ok(slot) = span.binary_search(bucket) {
                    out[slot] = cell;
                }
            }
            (key, out)
        })
        .collect();

    debug!(rows = buckets.len(), periods = span.len(), %freq, "resampled to last value");
    let mut out = Frame::with_index(RowIndex::Periods(span), columns)?;
    out.set_index_name(index_name);
    Ok(out)
}
