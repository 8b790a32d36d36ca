//! Currency symbol validation and ticker parsing.
//!
//! The service quotes every currency against the ruble only. A ticker such as
//! `USDRUB.CBR` is queried directly; `RUBUSD.CBR` is queried as `USDRUB.CBR`
//! and the result inverted.

use crate::error::SymbolError;

/// Reference currency of every published rate.
pub const RUB: &str = "RUB";

/// Ticker namespace suffix.
pub const CBR_SUFFIX: &str = ".CBR";

/// ISO codes the currency directory has carried, current and withdrawn.
pub const CURRENCY_CODES: [&str; 145] = [
    "AUD", "ATS", "AZN", "DZD", "GBP", "AON", "AMD", "BHD", "BYR", "BYN", "BEF",
    "BGN", "BOB", "BRL", "HUF", "VND", "HKD", "GRD", "GEL", "DKK", "AED", "USD",
    "EUR", "EGP", "INR", "IDR", "IRR", "IEP", "ISK", "ESP", "ITL", "KZT", "CAD",
    "QAR", "KGS", "CNY", "KWD", "CUP", "LVL", "LBP", "LTL", "MDL", "MNT", "DEM",
    "NGN", "NLG", "NZD", "NOK", "OMR", "PLN", "PTE", "SAR", "ROL", "RON", "XDR",
    "SGD", "SRD", "TJS", "THB", "BDT", "TRY", "TMM", "TMT", "UZS", "UAH", "FIM",
    "FRF", "CZK", "SEK", "CHF", "XEU", "EEK", "ETB", "YUN", "RSD", "ZAR", "KRW",
    "JPY", "MMK", "ALL", "AOA", "ARS", "AFN", "BWP", "BND", "BIF", "VEF", "KPW",
    "GMD", "GHS", "GNF", "ZWD", "ZWN", "ZRN", "ZMK", "ILS", "JOD", "IQD", "YER",
    "KES", "CYP", "COP", "CDF", "CRC", "LAK", "SLL", "LYD", "SZL", "MUR", "MRO",
    "MKD", "MWK", "MGA", "MYR", "MTL", "MAD", "MXN", "MZN", "NPR", "NIO", "PKR",
    "PYG", "PEN", "KHR", "SCR", "SYP", "SKK", "SIT", "SOS", "SDG", "TJR", "TWD",
    "TZS", "TND", "UGX", "UYU", "PHP", "DJF", "XAF", "XOF", "HRK", "CLP", "LKR",
    "ECS", "NAD",
];

pub fn is_known_currency(code: &str) -> bool {
    CURRENCY_CODES.contains(&code)
}

/// Reject symbols the service cannot answer for.
///
/// A bare six-letter pair of two known currencies without a ruble base is a
/// cross rate. Anything else that is not itself a known code must have a
/// ruble leg.
pub fn check_symbol(symbol: &str) -> Result<(), SymbolError> {
    if !symbol.is_ascii() {
        return Err(SymbolError::Malformed {
            symbol: symbol.to_string(),
        });
    }
    let pair = &symbol[..symbol.len().min(6)];
    let base = &pair[..pair.len().min(3)];
    let quote = pair.get(3..).unwrap_or("");

    if symbol.len() == 6 && base != RUB && is_known_currency(base) && is_known_currency(quote) {
        return Err(SymbolError::CrossPair {
            base: base.to_string(),
            quote: quote.to_string(),
        });
    }
    if !is_known_currency(symbol) && base != RUB && quote != RUB {
        return Err(SymbolError::Unsupported {
            symbol: symbol.to_string(),
        });
    }
    Ok(())
}

/// Which way round the service quotes a requested pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `XXXRUB`: published as is.
    Direct,
    /// `RUBXXX`: published as `XXXRUB`, needs inverting.
    Inverse,
}

/// A parsed currency ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    /// The requested symbol, upper-cased.
    pub symbol: String,
    /// The symbol actually sent to the service.
    pub query: String,
    /// Three-letter code looked up in the currency directory.
    pub base: String,
    pub direction: Direction,
}

/// Parse `USDRUB.CBR` or `RUBUSD.CBR` into the query the service understands.
pub fn split_ticker(symbol: &str) -> Result<Ticker, SymbolError> {
    let symbol = symbol.trim().to_ascii_uppercase();
    let malformed = || SymbolError::Malformed {
        symbol: symbol.clone(),
    };
    if !symbol.is_ascii() || symbol.len() < 3 {
        return Err(malformed());
    }

    let (query, direction) = match symbol.strip_prefix(RUB) {
        Some(rest) => {
            let foreign = rest.strip_suffix(CBR_SUFFIX).ok_or_else(malformed)?;
            if foreign.is_empty() {
                return Err(malformed());
            }
            (format!("{foreign}{RUB}{CBR_SUFFIX}"), Direction::Inverse)
        }
        None => (symbol.clone(), Direction::Direct),
    };
    let base = query[..3].to_string();

    Ok(Ticker {
        symbol,
        query,
        base,
        direction,
    })
}
