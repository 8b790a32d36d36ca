//! Export of tables and series: CSV, JSON, Polars DataFrame and Parquet.
//!
//! Every format writes the row index first, as a `date` column, when the
//! table is keyed by dates or periods; a positional index is not written.
//! Two-level column labels are flattened to `outer.inner`.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::frame::{Cell, Frame};

pub const DATE_COLUMN: &str = "date";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataframe export: {0}")]
    Polars(#[from] PolarsError),

    #[error("write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("export output is not valid UTF-8")]
    Utf8,
}

fn headers(frame: &Frame) -> Vec<String> {
    let mut out = Vec::with_capacity(frame.width() + 1);
    if frame.index().is_dated() {
        out.push(DATE_COLUMN.to_string());
    }
    out.extend(frame.keys().map(|k| k.to_string()));
    out
}

/// CSV with a header row; nulls are empty fields.
pub fn to_csv(frame: &Frame) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(headers(frame))?;

    let dated = frame.index().is_dated();
    for row in 0..frame.height() {
        let mut record = Vec::with_capacity(frame.width() + 1);
        if dated {
            record.push(frame.index().label(row));
        }
        record.extend(frame.columns().iter().map(|(_, cells)| cells[row].to_string()));
        wtr.write_record(&record)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(data).map_err(|_| ExportError::Utf8)
}

/// Column-split JSON layout: `{"columns": [...], "index": [...], "data": [[...]]}`.
#[derive(Serialize)]
struct SplitTable<'a> {
    columns: Vec<String>,
    index: Vec<String>,
    data: Vec<Vec<&'a Cell>>,
}

/// JSON in a column-split layout: labels, index labels and row-major values.
pub fn to_json(frame: &Frame) -> Result<String, ExportError> {
    let table = SplitTable {
        columns: frame.keys().map(|k| k.to_string()).collect(),
        index: (0..frame.height()).map(|i| frame.index().label(i)).collect(),
        data: (0..frame.height())
            .map(|row| frame.columns().iter().map(|(_, cells)| &cells[row]).collect())
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&table)?)
}

/// A Polars frame: `date` typed `Date`, numeric columns `Float64`, anything
/// holding text as `String`.
pub fn to_dataframe(frame: &Frame) -> Result<DataFrame, ExportError> {
    let mut columns = Vec::with_capacity(frame.width() + 1);

    if frame.index().is_dated() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
        let days: Vec<Option<i32>> = (0..frame.height())
            .map(|i| {
                frame
                    .index()
                    .date(i)
                    .map(|d| (d - epoch).num_days() as i32)
            })
            .collect();
        columns.push(Column::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?);
    }

    for (key, cells) in frame.columns() {
        let name: PlSmallStr = key.to_string().into();
        let textual = cells.iter().any(|c| matches!(c, Cell::Text(_)));
        let column = if textual {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|c| (!c.is_null()).then(|| c.to_string()))
                .collect();
            Column::new(name, values)
        } else {
            let values: Vec<Option<f64>> = cells.iter().map(Cell::as_f64).collect();
            Column::new(name, values)
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

/// Write [`to_dataframe`] to a Parquet file.
pub fn write_parquet(frame: &Frame, path: &Path) -> Result<(), ExportError> {
    let mut df = to_dataframe(frame)?;
    let file = fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    ParquetWriter::new(file).finish(&mut df)?;
    Ok(())
}
