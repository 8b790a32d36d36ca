//! International reserves.

use crate::error::CbrError;
use crate::frame::Normalized;
use crate::normalize::{LevelMapping, NormalizeOptions};
use crate::period::Frequency;
use crate::source::{Endpoint, RawSource};

use super::{fetch_normalized, Query};

pub const MRRF_FIRST_DATE: &str = "1999-01-01";

/// Reserve components by the service's field name.
pub const MRRF_COMPONENTS: [(&str, &str); 6] = [
    ("p1", "TOTAL_RESERVES"),
    ("p2", "CURRENCY_RESERVES"),
    ("p3", "FOREIGN_CURRENCY"),
    ("p4", "SDR_ACCOUNT"),
    ("p5", "IMF_RESERVE"),
    ("p6", "MONETARY_GOLD"),
];

/// International reserves and their components, monthly by default.
///
/// Values are in millions of US dollars, as published.
pub fn mrrf(source: &dyn RawSource, query: &Query) -> Result<Normalized, CbrError> {
    let options = NormalizeOptions::new(query.period_or(Frequency::Monthly))
        .level_1(LevelMapping::codes(MRRF_COMPONENTS));
    fetch_normalized(source, &Endpoint::Mrrf, query, MRRF_FIRST_DATE, options)
}
