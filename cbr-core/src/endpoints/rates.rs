//! Policy and interbank rates.

use crate::error::CbrError;
use crate::frame::Normalized;
use crate::normalize::{CodeMap, LevelMapping, NormalizeOptions};
use crate::period::Frequency;
use crate::source::{Endpoint, RawSource};

use super::{fetch_normalized, Query};

pub const KEY_RATE_FIRST_DATE: &str = "2013-09-13";
pub const IBOR_FIRST_DATE: &str = "2013-09-13";

/// Interbank rate families by the service's numeric code.
pub const IBOR_RATE_TYPES: [(&str, &str); 16] = [
    ("1", "MIBID_RUB"),
    ("2", "MIBOR_RUB"),
    ("3", "MIACR_RUB"),
    ("4", "MIACR_IG_RUB"),
    ("5", "MIACR_RUB_TURNOVER"),
    ("6", "MIACR_IG_RUB_TURNOVER"),
    ("7", "MIACR_B_RUB"),
    ("8", "MIACR_B_RUB_TURNOVER"),
    ("9", "MIBID_USD"),
    ("10", "MIBOR_USD"),
    ("11", "MIACR_USD"),
    ("12", "MIACR_IG_USD"),
    ("13", "MIACR_USD_TURNOVER"),
    ("14", "MIACR_IG_USD_TURNOVER"),
    ("15", "MIACR_B_USD"),
    ("16", "MIACR_B_USD_TURNOVER"),
];

pub const IBOR_TENORS: [(&str, &str); 4] = [
    ("d1", "D1"),
    ("d7", "D7"),
    ("d30", "D30"),
    ("d90", "D90"),
];

/// Central bank key rate, as the series `KEY_RATE` (daily by default).
pub fn key_rate(source: &dyn RawSource, query: &Query) -> Result<Normalized, CbrError> {
    let options = NormalizeOptions::new(query.period_or(Frequency::Daily))
        .level_1(LevelMapping::codes([("Rate", "KEY_RATE")]));
    fetch_normalized(source, &Endpoint::KeyRate, query, KEY_RATE_FIRST_DATE, options)
}

/// Interbank rates: one (rate family, tenor) column each, monthly by default.
pub fn ibor(source: &dyn RawSource, query: &Query) -> Result<Normalized, CbrError> {
    let options = NormalizeOptions::new(query.period_or(Frequency::Monthly))
        .level_0(CodeMap::from_pairs(IBOR_RATE_TYPES))
        .level_1(LevelMapping::codes(IBOR_TENORS));
    fetch_normalized(source, &Endpoint::Mkr, query, IBOR_FIRST_DATE, options)
}
