//! RUONIA fixings, index and averages; ROISfix swap rates.

use tracing::debug;

use crate::error::{CbrError, ShapeError};
use crate::frame::{ColumnKey, Normalized, Series};
use crate::normalize::{normalize_data, LevelMapping, NormalizeOptions};
use crate::period::Frequency;
use crate::source::{Endpoint, RawSource};

use super::{fetch_normalized, Query};

pub const RUONIA_FIRST_DATE: &str = "2010-01-01";
pub const ROISFIX_FIRST_DATE: &str = "2011-04-15";

pub const RUONIA_INDEX_FIELDS: [(&str, &str); 4] = [
    ("RUONIA_Index", "RUONIA_INDEX"),
    ("RUONIA_AVG_1M", "RUONIA_AVG_1M"),
    ("RUONIA_AVG_3M", "RUONIA_AVG_3M"),
    ("RUONIA_AVG_6M", "RUONIA_AVG_6M"),
];

pub const ROISFIX_TENORS: [(&str, &str); 6] = [
    ("R1W", "RATE_1_WEEK"),
    ("R2W", "RATE_2_WEEK"),
    ("R1M", "RATE_1_MONTH"),
    ("R2M", "RATE_2_MONTH"),
    ("R3M", "RATE_3_MONTH"),
    ("R6M", "RATE_6_MONTH"),
];

/// A symbol served from the RUONIA index table: its column and whether the
/// value is a percentage.
fn index_column(symbol: &str) -> Option<(&'static str, bool)> {
    match symbol {
        "RUONIA.INDX" => Some(("RUONIA_INDEX", false)),
        "RUONIA_AVG_1M.RATE" => Some(("RUONIA_AVG_1M", true)),
        "RUONIA_AVG_3M.RATE" => Some(("RUONIA_AVG_3M", true)),
        "RUONIA_AVG_6M.RATE" => Some(("RUONIA_AVG_6M", true)),
        _ => None,
    }
}

/// One RUONIA series by symbol.
///
/// `RUONIA.INDX` is the index level; `RUONIA_AVG_{1,3,6}M.RATE` are term
/// averages as fractions (5% is 0.05). Any other symbol returns the
/// overnight rate.
pub fn ruonia_ts(
    source: &dyn RawSource,
    symbol: &str,
    query: &Query,
) -> Result<Normalized, CbrError> {
    let Some((column, percent)) = index_column(symbol) else {
        return ruonia_overnight(source, query);
    };
    debug!(symbol, column, "serving from the RUONIA index table");

    let daily = Query {
        period: Some(Frequency::Daily),
        ..query.clone()
    };
    let table = ruonia_index(source, &daily)?;
    if table.is_empty() {
        return Ok(Normalized::Series(Series::empty(Some(ColumnKey::flat(column)))));
    }

    let key = ColumnKey::flat(column);
    let mut series = table
        .column(&key)
        .ok_or_else(|| ShapeError::MissingColumn {
            column: column.to_string(),
        })?;
    if percent {
        series = series.map_numeric(|v| v / 100.0);
    }

    let options = NormalizeOptions::new(query.period_or(Frequency::Daily));
    Ok(normalize_data(series, &options)?)
}

/// RUONIA index and its 1, 3 and 6 month averages (averages in percent).
pub fn ruonia_index(source: &dyn RawSource, query: &Query) -> Result<Normalized, CbrError> {
    let options = NormalizeOptions::new(query.period_or(Frequency::Daily))
        .level_1(LevelMapping::codes(RUONIA_INDEX_FIELDS));
    fetch_normalized(source, &Endpoint::RuoniaSv, query, RUONIA_FIRST_DATE, options)
}

/// Overnight RUONIA as a fraction, series `RUONIA_OVERNIGHT`.
pub fn ruonia_overnight(source: &dyn RawSource, query: &Query) -> Result<Normalized, CbrError> {
    let options = NormalizeOptions::new(query.period_or(Frequency::Daily))
        .level_1(LevelMapping::codes([("ruo", "RUONIA_OVERNIGHT")]));
    let data = fetch_normalized(source, &Endpoint::Ruonia, query, RUONIA_FIRST_DATE, options)?;
    Ok(data.map_numeric(|v| v / 100.0))
}

/// ROISfix fixings for six tenors, in percent.
pub fn roisfix(source: &dyn RawSource, query: &Query) -> Result<Normalized, CbrError> {
    let options = NormalizeOptions::new(query.period_or(Frequency::Daily))
        .level_1(LevelMapping::codes(ROISFIX_TENORS));
    fetch_normalized(source, &Endpoint::Roisfix, query, ROISFIX_FIRST_DATE, options)
}
