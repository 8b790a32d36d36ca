//! Request date parsing.
//!
//! The service accepts full calendar dates only; users may also give a bare
//! month, which means its first day. "Today" is always passed in by the
//! caller so that defaults are deterministic.

use chrono::NaiveDate;

use crate::error::DateFormatError;

const FULL_DATE: &str = "%Y-%m-%d";

/// Parse `input` as `YYYY-MM-DD`, falling back to `YYYY-MM` (day 1).
///
/// An absent or blank `input` parses `default` instead, which must be a full
/// `YYYY-MM-DD` date.
pub fn guess_date(input: Option<&str>, default: &str) -> Result<NaiveDate, DateFormatError> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => NaiveDate::parse_from_str(text, FULL_DATE)
            .or_else(|_| NaiveDate::parse_from_str(&format!("{text}-01"), FULL_DATE))
            .map_err(|_| DateFormatError {
                input: text.to_string(),
            }),
        None => NaiveDate::parse_from_str(default.trim(), FULL_DATE).map_err(|_| DateFormatError {
            input: default.to_string(),
        }),
    }
}

/// Inclusive request window for one remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Resolve optional user bounds: the start defaults to the endpoint's first
    /// published date, the end to `today`.
    pub fn resolve(
        first: Option<&str>,
        last: Option<&str>,
        default_first: &str,
        today: NaiveDate,
    ) -> Result<Self, DateFormatError> {
        let start = guess_date(first, default_first)?;
        let end = guess_date(last, &today.format(FULL_DATE).to_string())?;
        Ok(Self { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn full_date_is_parsed() {
        assert_eq!(guess_date(Some("2020-03-15"), "2000-01-01").unwrap(), d(2020, 3, 15));
    }

    #[test]
    fn bare_month_means_first_day() {
        assert_eq!(guess_date(Some("2021-02"), "2000-01-01").unwrap(), d(2021, 2, 1));
    }

    #[test]
    fn absent_or_blank_input_uses_default() {
        assert_eq!(guess_date(None, "2013-09-13").unwrap(), d(2013, 9, 13));
        assert_eq!(guess_date(Some(""), "2013-09-13").unwrap(), d(2013, 9, 13));
    }

    #[test]
    fn other_formats_fail() {
        for bad in ["15.03.2020", "2020", "2020-13", "2020-02-30", "yesterday"] {
            let err = guess_date(Some(bad), "2000-01-01").unwrap_err();
            assert_eq!(err.input, bad);
        }
    }

    #[test]
    fn default_must_be_a_full_date() {
        assert!(guess_date(None, "2013-09").is_err());
    }

    #[test]
    fn range_defaults_end_to_today() {
        let today = d(2024, 6, 30);
        let range = DateRange::resolve(None, None, "2010-01-01", today).unwrap();
        assert_eq!(range.start, d(2010, 1, 1));
        assert_eq!(range.end, today);

        let range = DateRange::resolve(Some("2020-01"), Some("2020-02"), "2010-01-01", today).unwrap();
        assert_eq!(range.start, d(2020, 1, 1));
        assert_eq!(range.end, d(2020, 2, 1));
    }
}
