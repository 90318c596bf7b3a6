use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An accounting year running April 1 through March 31, identified by the
/// calendar year it starts in and labelled `"2026_27"` style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    /// Returns the fiscal year containing `date`: April and later belong to
    /// the year starting that April, January through March to the previous
    /// one.
    pub fn containing(date: NaiveDate) -> Self {
        let start_year = if date.month() >= 4 {
            date.year()
        } else {
            date.year() - 1
        };
        Self { start_year }
    }

    pub fn starting(start_year: i32) -> Self {
        Self { start_year }
    }

    /// April 1 of the starting year.
    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year, 4, 1).expect("April 1 exists in every year")
    }

    /// March 31 of the following year.
    pub fn end(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year + 1, 3, 31).expect("March 31 exists in every year")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::containing(date) == *self
    }

    /// The `"<start>_<endYY>"` label, e.g. `"2026_27"`.
    pub fn label(&self) -> String {
        format!("{}_{:02}", self.start_year, (self.start_year + 1).rem_euclid(100))
    }

    /// Inverse of [`FiscalYear::label`]. Returns `None` when the text is not
    /// a well-formed label or the end digits do not follow the start year.
    pub fn parse_label(text: &str) -> Option<Self> {
        let (start, end) = text.split_once('_')?;
        let start_year: i32 = start.parse().ok()?;
        if end.len() != 2 || !end.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let end_digits: i32 = end.parse().ok()?;
        if (start_year + 1).rem_euclid(100) != end_digits {
            return None;
        }
        Some(Self { start_year })
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Quarter of a fiscal year. Q1 is April through June regardless of where
/// the month falls in the calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            4..=6 => Quarter::Q1,
            7..=9 => Quarter::Q2,
            10..=12 => Quarter::Q3,
            _ => Quarter::Q4,
        }
    }

    /// Zero-based position within the fiscal year, for bucket arrays.
    pub fn index(&self) -> usize {
        match self {
            Quarter::Q1 => 0,
            Quarter::Q2 => 1,
            Quarter::Q3 => 2,
            Quarter::Q4 => 3,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quarter::Q1 => write!(f, "Q1"),
            Quarter::Q2 => write!(f, "Q2"),
            Quarter::Q3 => write!(f, "Q3"),
            Quarter::Q4 => write!(f, "Q4"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseQuarterError(String);

impl fmt::Display for ParseQuarterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid quarter: {}", self.0)
    }
}

impl std::error::Error for ParseQuarterError {}

impl FromStr for Quarter {
    type Err = ParseQuarterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            _ => Err(ParseQuarterError(s.to_string())),
        }
    }
}
