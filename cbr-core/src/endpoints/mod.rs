//! Per-endpoint fetchers: request window → one remote call → normalized data.
//!
//! Every fetcher takes its source as `&dyn RawSource` and a [`Query`]
//! carrying the user's bounds, the output period and today's date. Bounds
//! accept `YYYY-MM-DD` or `YYYY-MM`; a missing start falls back to the first
//! date the endpoint publishes and a missing end to today.

pub mod currency;
pub mod metals;
pub mod rates;
pub mod reserves;
pub mod ruonia;

use chrono::NaiveDate;
use tracing::debug;

use crate::dates::DateRange;
use crate::error::CbrError;
use crate::frame::{Frame, Normalized};
use crate::normalize::{normalize_data, NormalizeOptions};
use crate::period::Frequency;
use crate::source::{Endpoint, RawSource};

pub use currency::{currencies_list, currency_code, currency_rate};
pub use metals::metals_prices;
pub use rates::{ibor, key_rate};
pub use reserves::mrrf;
pub use ruonia::{roisfix, ruonia_index, ruonia_overnight, ruonia_ts};

/// User-facing request parameters shared by all fetchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub first: Option<String>,
    pub last: Option<String>,
    /// Output granularity; each endpoint has its own default.
    pub period: Option<Frequency>,
    pub today: NaiveDate,
}

impl Query {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            first: None,
            last: None,
            period: None,
            today,
        }
    }

    pub fn first(mut self, date: impl Into<String>) -> Self {
        self.first = Some(date.into());
        self
    }

    pub fn last(mut self, date: impl Into<String>) -> Self {
        self.last = Some(date.into());
        self
    }

    pub fn period(mut self, period: Frequency) -> Self {
        self.period = Some(period);
        self
    }

    pub(crate) fn period_or(&self, default: Frequency) -> Frequency {
        self.period.unwrap_or(default)
    }

    /// Resolve the request window for an endpoint first published on `default_first`.
    pub fn range(&self, default_first: &str) -> Result<DateRange, CbrError> {
        Ok(DateRange::resolve(
            self.first.as_deref(),
            self.last.as_deref(),
            default_first,
            self.today,
        )?)
    }
}

/// Fetch the raw table of `endpoint` over the query window.
pub(crate) fn fetch_raw(
    source: &dyn RawSource,
    endpoint: &Endpoint,
    query: &Query,
    default_first: &str,
) -> Result<Frame, CbrError> {
    let range = query.range(default_first)?;
    let raw = source.fetch(endpoint, range.start, range.end)?;
    debug!(
        source = source.name(),
        method = endpoint.method(),
        rows = raw.height(),
        "fetched raw table"
    );
    Ok(raw)
}

/// Fetch and normalize in one step; `options.shape` is taken from the endpoint.
pub(crate) fn fetch_normalized(
    source: &dyn RawSource,
    endpoint: &Endpoint,
    query: &Query,
    default_first: &str,
    options: NormalizeOptions,
) -> Result<Normalized, CbrError> {
    let raw = fetch_raw(source, endpoint, query, default_first)?;
    let options = options.shape(endpoint.shape());
    Ok(normalize_data(raw, &options)?)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-table source for fetcher tests.

    use super::*;
    use crate::error::FetchError;
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct CannedSource {
        pub tables: Vec<(Endpoint, Frame)>,
        pub calls: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
    }

    impl CannedSource {
        pub fn with(mut self, endpoint: Endpoint, frame: Frame) -> Self {
            self.tables.push((endpoint, frame));
            self
        }
    }

    impl RawSource for CannedSource {
        fn name(&self) -> &str {
            "canned"
        }

        fn fetch(
            &self,
            endpoint: &Endpoint,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Frame, FetchError> {
            self.calls
                .borrow_mut()
                .push((endpoint.method().to_string(), start, end));
            Ok(self
                .tables
                .iter()
                .find(|(e, _)| e == endpoint)
                .map(|(_, f)| f.clone())
                .unwrap_or_default())
        }
    }
}
