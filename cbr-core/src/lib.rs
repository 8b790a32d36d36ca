//! cbr-core: Bank of Russia time series, fetched and normalized.
//!
//! The crate pulls tables from the `DailyInfo` web service and turns them
//! into clean, period-indexed series:
//! - Tabular data model (cells, column labels, row indexes, frames, series)
//! - Normalization pipeline: date promotion, bookkeeping cleanup, group
//!   unstacking, code renaming, gap filling, monthly resampling
//! - Request date parsing and currency symbol validation
//! - SOAP client and per-endpoint fetchers
//! - CSV / JSON / Parquet export

pub mod config;
pub mod dates;
pub mod endpoints;
pub mod error;
pub mod export;
pub mod frame;
pub mod normalize;
pub mod period;
pub mod source;
pub mod symbols;

pub use config::CbrConfig;
pub use dates::{guess_date, DateRange};
pub use endpoints::Query;
pub use error::{CbrError, DateFormatError, FetchError, ShapeError, SymbolError};
pub use frame::{Cell, ColumnKey, Frame, Normalized, RowIndex, Series};
pub use normalize::{
    calculate_inverse_rate, normalize_data, pad, CodeMap, LevelMapping, NormalizeOptions, RawShape,
};
pub use period::{Frequency, Period};
pub use source::{Endpoint, RawSource, SoapSource};
