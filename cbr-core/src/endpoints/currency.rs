//! Official ruble exchange rates and the currency directory.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::error::{CbrError, ShapeError, SymbolError};
use crate::frame::{Cell, ColumnKey, Frame, Normalized, Series};
use crate::normalize::{
    calculate_inverse_rate, normalize_data, promote_date_column, LevelMapping, NormalizeOptions,
};
use crate::period::Frequency;
use crate::source::{Endpoint, RawSource};
use crate::symbols::{check_symbol, split_ticker, Direction, Ticker};

use super::{fetch_raw, Query};

/// Earliest date with official rates in the service.
pub const CURRENCY_FIRST_DATE: &str = "1992-07-01";

const RATE_COLUMNS: [&str; 6] = ["rowOrder", "id", "Vnom", "Vcode", "CursDate", "Vcurs"];
const OPTIONAL_RATE_COLUMN: &str = "VunitRate";

/// The currency directory: currencies with daily rates followed by those
/// with monthly rates, as one raw table.
pub fn currencies_list(source: &dyn RawSource, today: NaiveDate) -> Result<Frame, CbrError> {
    let daily = source.fetch(&Endpoint::EnumValutes { monthly: false }, today, today)?;
    let monthly = source.fetch(&Endpoint::EnumValutes { monthly: true }, today, today)?;
    debug!(daily = daily.height(), monthly = monthly.height(), "fetched currency directory");
    Ok(daily.vstack(monthly)?)
}

/// Directory code for a ticker: `USDRUB.CBR` → `R01235`.
///
/// The ticker's base currency is matched against `VcharCode`. Some
/// currencies are listed twice (a redenominated successor); the first row
/// wins.
pub fn currency_code(
    source: &dyn RawSource,
    ticker: &str,
    today: NaiveDate,
) -> Result<String, CbrError> {
    let ticker = split_ticker(ticker)?;
    lookup_code(source, &ticker, today)
}

fn lookup_code(
    source: &dyn RawSource,
    ticker: &Ticker,
    today: NaiveDate,
) -> Result<String, CbrError> {
    let not_listed = || SymbolError::NotListed {
        ticker: ticker.query.clone(),
    };

    let list = currencies_list(source, today)?;
    let (Some(chars), Some(codes)) = (list.column("VcharCode"), list.column("Vcode")) else {
        return Err(not_listed().into());
    };

    chars
        .iter()
        .zip(codes)
        .find(|(c, _)| c.as_text() == Some(ticker.base.as_str()))
        .and_then(|(_, code)| code.as_text())
        .map(|code| code.trim().to_string())
        .ok_or_else(|| not_listed().into())
}

/// Official rate history for `symbol` (`USDRUB.CBR`, or `RUBUSD.CBR` for the
/// inverse quote), as a series named by the symbol.
///
/// Rates are per one unit of the foreign currency. Currencies without any
/// published rates in the window give an empty series.
pub fn currency_rate(
    source: &dyn RawSource,
    symbol: &str,
    query: &Query,
) -> Result<Normalized, CbrError> {
    let ticker = split_ticker(symbol)?;
    check_symbol(&ticker.symbol)?;
    let code = lookup_code(source, &ticker, query.today)?;

    let raw = fetch_raw(source, &Endpoint::CursDynamic { code }, query, CURRENCY_FIRST_DATE)?;
    if raw.is_empty() {
        warn!(symbol = %ticker.symbol, "no rates published in the requested window");
        return Ok(Normalized::Series(Series::empty(Some(ColumnKey::flat(
            ticker.symbol,
        )))));
    }
    check_rate_columns(&raw)?;

    let rates = per_unit_rates(&raw)?;
    let frame = promote_date_column(rates, "CursDate")?;
    let options = NormalizeOptions::new(query.period_or(Frequency::Daily))
        .level_1(LevelMapping::name(ticker.symbol.clone()));

    let normalized = normalize_data(frame, &options)?;
    Ok(match (ticker.direction, normalized) {
        (Direction::Inverse, Normalized::Series(series)) => {
            Normalized::Series(calculate_inverse_rate(series))
        }
        (_, other) => other,
    })
}

/// The response must carry exactly the known columns, `VunitRate` optional.
fn check_rate_columns(raw: &Frame) -> Result<(), ShapeError> {
    let found: BTreeSet<&str> = raw.names().into_iter().collect();
    let required: BTreeSet<&str> = RATE_COLUMNS.into_iter().collect();
    let mut extended = required.clone();
    extended.insert(OPTIONAL_RATE_COLUMN);

    if found == required || found == extended {
        Ok(())
    } else {
        Err(ShapeError::UnexpectedColumns {
            found: raw.names().into_iter().map(str::to_string).collect(),
        })
    }
}

/// `CursDate` plus `Vcurs / Vnom` as the only value column.
///
/// A null quote or nominal gives a null rate; anything else that is not a
/// number, and a zero nominal, is an error.
fn per_unit_rates(raw: &Frame) -> Result<Frame, ShapeError> {
    let column = |name: &str| {
        raw.column(name).ok_or_else(|| ShapeError::MissingColumn {
            column: name.to_string(),
        })
    };
    let dates = column("CursDate")?.to_vec();
    let rates = column("Vcurs")?
        .iter()
        .zip(column("Vnom")?)
        .map(|(curs, nom)| {
            if curs.is_null() || nom.is_null() {
                return Ok(Cell::Null);
            }
            let curs = numeric("Vcurs", curs)?;
            match numeric("Vnom", nom)? {
                n if n == 0.0 => Err(unparseable("Vnom", nom)),
                n => Ok(Cell::Float(curs / n)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Frame::from_columns(vec![("CursDate", dates), ("rate", rates)])
}

fn numeric(column: &str, cell: &Cell) -> Result<f64, ShapeError> {
    cell.as_f64().ok_or_else(|| unparseable(column, cell))
}

fn unparseable(column: &str, cell: &Cell) -> ShapeError {
    ShapeError::UnparseableValue {
        column: column.to_string(),
        value: cell.to_string(),
    }
}
