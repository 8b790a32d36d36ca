//! The normalization pipeline.
//!
//! Raw responses differ in date column names, carry bookkeeping columns,
//! sometimes arrive in long (grouped) form and always label values with
//! service codes. [`normalize_data`] runs the fixed sequence
//!
//! clean → unstack → rename → pad → resample → squeeze
//!
//! and returns a date-period-indexed [`Normalized`] value.

pub mod clean;
pub mod pad;
pub mod rename;
pub mod resample;
pub mod unstack;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ShapeError;
use crate::frame::{Frame, Normalized, Series};
use crate::period::Frequency;

pub use clean::{promote_date_column, remove_unnecessary_columns, set_datetime_index};
pub use pad::{pad_missing_periods, pad_series};
pub use rename::{column_rename, CodeMap, LevelMapping};
pub use resample::resample_last;
pub use unstack::{unstack_groups, RawShape};

/// Caller-specific pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Output granularity. Gap filling is always daily; `Monthly` then
    /// keeps the last value of each month.
    pub period: Frequency,
    /// Outer-level code map (two-level tables only).
    pub level_0: Option<CodeMap>,
    /// Inner-level or flat code map, or a bare name for one column.
    pub level_1: Option<LevelMapping>,
    pub shape: RawShape,
    /// Extend forward fill through this date.
    pub extend_to: Option<NaiveDate>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            period: Frequency::Daily,
            level_0: None,
            level_1: None,
            shape: RawShape::Flat,
            extend_to: None,
        }
    }
}

impl NormalizeOptions {
    pub fn new(period: Frequency) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    pub fn level_0(mut self, map: CodeMap) -> Self {
        self.level_0 = Some(map);
        self
    }

    pub fn level_1(mut self, mapping: LevelMapping) -> Self {
        self.level_1 = Some(mapping);
        self
    }

    pub fn shape(mut self, shape: RawShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn extend_to(mut self, end: NaiveDate) -> Self {
        self.extend_to = Some(end);
        self
    }
}

/// Run the full pipeline on a raw table (or a series, promoted to a
/// one-column table first).
///
/// A table with no rows yields an empty series under any options.
pub fn normalize_data(
    raw: impl Into<Frame>,
    options: &NormalizeOptions,
) -> Result<Normalized, ShapeError> {
    let frame: Frame = raw.into();
    debug!(
        rows = frame.height(),
        columns = frame.width(),
        shape = ?options.shape,
        period = %options.period,
        "normalizing"
    );

    let frame = set_datetime_index(frame)?;
    let frame = remove_unnecessary_columns(frame);
    let frame = unstack_groups(frame, options.shape)?;
    let frame = column_rename(frame, options.level_0.as_ref(), options.level_1.as_ref());
    let frame = pad_missing_periods(frame, Frequency::Daily, options.extend_to)?;
    let frame = match options.period {
        Frequency::Monthly => resample_last(frame, Frequency::Monthly)?,
        Frequency::Daily => frame,
    };

    let out = frame.squeeze();
    debug!(rows = out.height(), columns = out.keys().len(), "normalized");
    Ok(out)
}

/// Gap-fill a series or table at `freq`, optionally through `end`.
pub fn pad(
    data: Normalized,
    freq: Frequency,
    end: Option<NaiveDate>,
) -> Result<Normalized, ShapeError> {
    match data {
        Normalized::Series(series) => pad_series(series, freq, end).map(Normalized::Series),
        Normalized::Table(frame) => pad_missing_periods(frame, freq, end).map(Normalized::Table),
    }
}

/// Element-wise reciprocal, for quoting a rate the other way round.
pub fn calculate_inverse_rate(series: Series) -> Series {
    series.map_numeric(|v| 1.0 / v)
}
