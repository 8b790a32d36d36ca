//! Precious metals prices.

use crate::error::CbrError;
use crate::frame::Normalized;
use crate::normalize::{LevelMapping, NormalizeOptions};
use crate::period::Frequency;
use crate::source::{Endpoint, RawSource};

use super::{fetch_normalized, Query};

pub const METALS_FIRST_DATE: &str = "1999-10-01";

/// Metal names by the service's `CodMet` code.
pub const METAL_CODES: [(&str, &str); 4] = [
    ("1", "GOLD"),
    ("2", "SILVER"),
    ("3", "PLATINUM"),
    ("4", "PALLADIUM"),
];

/// Accounting prices of gold, silver, platinum and palladium (rubles per gram).
pub fn metals_prices(source: &dyn RawSource, query: &Query) -> Result<Normalized, CbrError> {
    let options = NormalizeOptions::new(query.period_or(Frequency::Daily))
        .level_1(LevelMapping::codes(METAL_CODES));
    fetch_normalized(source, &Endpoint::DragMetDynamic, query, METALS_FIRST_DATE, options)
}
