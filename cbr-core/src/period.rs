//! Calendar periods: the index unit of every normalized series.
//!
//! A [`Period`] is a whole day or a whole month, not an instant. Two periods
//! of the same frequency compare by their start date, so a sorted
//! `Vec<Period>` is chronological.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity of a period index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Monthly,
}

impl Frequency {
    /// Parse the one-letter codes used on the command line (`D`, `M`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "D" => Some(Frequency::Daily),
            "M" => Some(Frequency::Monthly),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Frequency::Daily => "D",
            Frequency::Monthly => "M",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A calendar day or month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    freq: Frequency,
    start: NaiveDate,
}

impl Period {
    /// The period of `freq` that contains `date`.
    pub fn new(date: NaiveDate, freq: Frequency) -> Self {
        let start = match freq {
            Frequency::Daily => date,
            Frequency::Monthly => date - Days::new(u64::from(date.day0())),
        };
        Self { freq, start }
    }

    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, Frequency::Daily)
    }

    pub fn month(date: NaiveDate) -> Self {
        Self::new(date, Frequency::Monthly)
    }

    pub fn freq(self) -> Frequency {
        self.freq
    }

    /// First calendar day covered by this period.
    pub fn start(self) -> NaiveDate {
        self.start
    }

    /// Re-express this period at another frequency (by its start date).
    pub fn at(self, freq: Frequency) -> Self {
        Self::new(self.start, freq)
    }

    /// The next period, or `None` at the end of the calendar.
    pub fn succ(self) -> Option<Self> {
        let next = match self.freq {
            Frequency::Daily => self.start.checked_add_days(Days::new(1)),
            Frequency::Monthly => self.start.checked_add_months(Months::new(1)),
        }?;
        Some(Self {
            freq: self.freq,
            start: next,
        })
    }

    /// Every period from `first` through `last`, inclusive.
    ///
    /// Empty when `last < first`. Both ends must share a frequency; `last` is
    /// re-expressed at `first`'s frequency otherwise.
    pub fn range(first: Period, last: Period) -> Vec<Period> {
        let last = last.at(first.freq);
        let mut out = Vec::new();
        let mut current = Some(first);
        while let Some(p) = current {
            if p > last {
                break;
            }
            out.push(p);
            current = p.succ();
        }
        out
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.freq {
            Frequency::Daily => write!(f, "{}", self.start.format("%Y-%m-%d")),
            Frequency::Monthly => write!(f, "{:04}-{:02}", self.start.year(), self.start.month()),
        }
    }
}
