//! Remote data source: the `DailyInfo` SOAP web service.
//!
//! [`RawSource`] abstracts the transport so endpoint fetchers can be tested
//! against canned tables. [`SoapSource`] is the real client; it performs one
//! blocking request per call and never retries.

pub mod soap;
pub mod xml;

use chrono::NaiveDate;

use crate::error::FetchError;
use crate::frame::Frame;
use crate::normalize::RawShape;

pub use soap::SoapSource;

/// Namespace of the service's SOAP methods.
pub const SERVICE_NAMESPACE: &str = "http://web.cbr.ru/";

/// One remote method of the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    KeyRate,
    /// Interbank lending rates.
    Mkr,
    /// Precious metals prices.
    DragMetDynamic,
    /// International reserves.
    Mrrf,
    /// RUONIA overnight fixings.
    Ruonia,
    /// RUONIA index and term averages.
    RuoniaSv,
    Roisfix,
    /// Official rate history of one currency, by directory code.
    CursDynamic { code: String },
    /// The currency directory; `monthly` selects currencies fixed monthly.
    EnumValutes { monthly: bool },
}

impl Endpoint {
    /// SOAP method name.
    pub fn method(&self) -> &'static str {
        match self {
            Endpoint::KeyRate => "KeyRate",
            Endpoint::Mkr => "MKR",
            Endpoint::DragMetDynamic => "DragMetDynamic",
            Endpoint::Mrrf => "mrrf",
            Endpoint::Ruonia => "Ruonia",
            Endpoint::RuoniaSv => "RuoniaSV",
            Endpoint::Roisfix => "ROISfix",
            Endpoint::CursDynamic { .. } => "GetCursDynamic",
            Endpoint::EnumValutes { .. } => "EnumValutesXML",
        }
    }

    /// Element name of one data row in the response.
    pub fn row_tag(&self) -> &'static str {
        match self {
            Endpoint::KeyRate => "KR",
            Endpoint::Mkr => "MKR",
            Endpoint::DragMetDynamic => "DrgMet",
            Endpoint::Mrrf => "mr",
            Endpoint::Ruonia => "ro",
            Endpoint::RuoniaSv => "ra",
            Endpoint::Roisfix => "rf",
            Endpoint::CursDynamic { .. } => "ValuteCursDynamic",
            Endpoint::EnumValutes { .. } => "EnumValutes",
        }
    }

    /// Raw layout of the rows, for the unstacking stage.
    pub fn shape(&self) -> RawShape {
        RawShape::from_hint(self.row_tag())
    }

    /// Named SOAP arguments for a request covering `start..=end`.
    pub fn arguments(&self, start: NaiveDate, end: NaiveDate) -> Vec<(&'static str, String)> {
        let from = soap_datetime(start);
        let to = soap_datetime(end);
        match self {
            Endpoint::Mrrf => vec![("D1", from), ("D2", to)],
            Endpoint::CursDynamic { code } => vec![
                ("FromDate", from),
                ("ToDate", to),
                ("ValutaCode", code.clone()),
            ],
            Endpoint::EnumValutes { monthly } => vec![("Seld", monthly.to_string())],
            _ => vec![("fromDate", from), ("ToDate", to)],
        }
    }
}

/// `xs:dateTime` at midnight.
fn soap_datetime(date: NaiveDate) -> String {
    format!("{}T00:00:00", date.format("%Y-%m-%d"))
}

/// Anything that can answer an endpoint request with a raw table.
pub trait RawSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the raw rows of `endpoint` for `start..=end`. Dates are ignored
    /// by endpoints that take none. No rows is an empty table, not an error.
    fn fetch(&self, endpoint: &Endpoint, start: NaiveDate, end: NaiveDate)
        -> Result<Frame, FetchError>;
}
