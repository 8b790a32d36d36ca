//! Structured error types for parsing, normalization, symbols and fetching.
//!
//! Each concern has its own enum so callers can match on the failure they
//! care about; [`CbrError`] aggregates them for the per-endpoint fetchers.
//! An empty response is never an error: it travels through the pipeline as an
//! empty series.

use thiserror::Error;

/// A user-supplied date matched neither `YYYY-MM-DD` nor `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised date '{input}': expected YYYY-MM-DD or YYYY-MM")]
pub struct DateFormatError {
    pub input: String,
}

/// The table does not have the shape the pipeline expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("no recognisable date column: row index is still positional")]
    MissingDateColumn,

    #[error("duplicate index entry {period} remains after cleaning")]
    DuplicateIndex { period: String },

    #[error("column '{column}' holds an unparseable date: '{value}'")]
    UnparseableDate { column: String, value: String },

    #[error("column '{column}' holds a value that is not a usable number: '{value}'")]
    UnparseableValue { column: String, value: String },

    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("response has unexpected columns {found:?}; the data format has probably changed")]
    UnexpectedColumns { found: Vec<String> },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("cannot stack tables with non-positional row indexes")]
    NotPositional,
}

/// A ticker that the service cannot answer for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("malformed symbol '{symbol}'")]
    Malformed { symbol: String },

    #[error("the service does not publish cross rates: {base}/{quote}")]
    CrossPair { base: String, quote: String },

    #[error("the service does not support symbol '{symbol}'")]
    Unsupported { symbol: String },

    #[error("there is no {ticker} in the currency directory")]
    NotListed { ticker: String },
}

/// Failures of the remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {method}")]
    HttpStatus { method: String, status: u16 },

    #[error("SOAP fault from {method}: {message}")]
    Soap { method: String, message: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),
}

/// Top-level error returned by the endpoint fetchers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CbrError {
    #[error(transparent)]
    Date(#[from] DateFormatError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
