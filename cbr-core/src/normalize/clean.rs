//! Table cleaning: date-column promotion and bookkeeping-column removal.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::ShapeError;
use crate::frame::{Cell, ColumnKey, Frame, RowIndex};

/// Substrings that mark a date column, checked in this order.
pub const DATE_MARKERS: [&str; 4] = ["CDate", "DateMet", "D0", "DT"];

/// Service bookkeeping columns with no semantic value.
pub const BOOKKEEPING_COLUMNS: [&str; 4] = ["id", "rowOrder", "vol", "DateUpdate"];

/// Name given to a promoted date index.
pub const DATE_INDEX_NAME: &str = "DATE";

/// Promote the first date-marked column to the row index.
///
/// Columns are scanned in their existing order. A table that is empty or
/// already date-indexed is returned unchanged, as is one with no marked
/// column (the missing index surfaces later, when gap filling needs it).
pub fn set_datetime_index(frame: Frame) -> Result<Frame, ShapeError> {
    if frame.is_empty() || frame.index().is_dated() {
        return Ok(frame);
    }

    let found = frame.keys().find_map(|key| match key {
        ColumnKey::Flat(name) if DATE_MARKERS.iter().any(|m| name.contains(m)) => {
            Some(name.clone())
        }
        _ => None,
    });

    match found {
        Some(name) => promote_date_column(frame, &name),
        None => {
            warn!(columns = ?frame.names(), "no date column found");
            Ok(frame)
        }
    }
}

/// Parse `column` as calendar dates, make it the index named `DATE` and drop it.
pub fn promote_date_column(mut frame: Frame, column: &str) -> Result<Frame, ShapeError> {
    let cells = frame
        .drop_column(column)
        .ok_or_else(|| ShapeError::MissingColumn {
            column: column.to_string(),
        })?;

    let dates = cells
        .iter()
        .map(|cell| parse_date_cell(column, cell))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(column, rows = dates.len(), "promoted date column to index");
    frame.set_index(RowIndex::Dates(dates))?;
    frame.set_index_name(Some(DATE_INDEX_NAME.to_string()));
    Ok(frame)
}

/// Text is cut at the first `T`, dropping any time-of-day and offset.
fn parse_date_cell(column: &str, cell: &Cell) -> Result<NaiveDate, ShapeError> {
    let unparseable = || ShapeError::UnparseableDate {
        column: column.to_string(),
        value: cell.to_string(),
    };
    let text = cell.as_text().ok_or_else(unparseable)?;
    let day = text.split('T').next().unwrap_or(text).trim();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| unparseable())
}

/// Drop whichever bookkeeping columns are present. Empty tables pass through.
pub fn remove_unnecessary_columns(mut frame: Frame) -> Frame {
    if frame.is_empty() {
        return frame;
    }
    for name in BOOKKEEPING_COLUMNS {
        frame.drop_column(name);
    }
    frame
}
