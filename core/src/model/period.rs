use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One billing cycle, a calendar year-month.
///
/// The canonical text form is zero-padded "YYYY-MM". Keeping the padding is
/// an invariant: it makes lexical order on the strings agree with the derived
/// `Ord` on (year, month), and the dashboard's latest-period lookup relies on
/// that agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
            return Err(ValidationError::InvalidPeriod(format!("{year}-{month}")));
        }
        Ok(Period { year, month })
    }

    /// The month the system clock says it is right now.
    pub fn current() -> Self {
        let today = Local::now();
        Period {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month, rolling 12 into January of the next year.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Period {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Period {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Human-facing "MM/YYYY", used by tables and the CSV report.
    pub fn display_reversed(&self) -> String {
        format!("{:02}/{:04}", self.month, self.year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidPeriod(s.to_string());
        let (year_str, month_str) = s.split_once('-').ok_or_else(|| invalid())?;
        if year_str.len() != 4 || month_str.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;
        Period::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Period {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_round_trip() {
        let p: Period = "2025-03".parse().unwrap();
        assert_eq!(p.year(), 2025);
        assert_eq!(p.month(), 3);
        assert_eq!(p.to_string(), "2025-03");
        assert_eq!(p.display_reversed(), "03/2025");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("2025-13".parse::<Period>().is_err());
        assert!("2025-00".parse::<Period>().is_err());
        // Padding is part of the format, not just a convention.
        assert!("2025-3".parse::<Period>().is_err());
        assert!("25-03".parse::<Period>().is_err());
        assert!("2025/03".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }

    #[test]
    fn test_next_rolls_year_over() {
        let nov: Period = "2025-11".parse().unwrap();
        assert_eq!(nov.next().to_string(), "2025-12");
        let dec: Period = "2025-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2026-01");
    }

    #[test]
    fn test_ord_matches_string_order() {
        let mut periods: Vec<Period> = ["2025-10", "2024-12", "2025-02", "2025-01"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        periods.sort();
        let as_strings: Vec<String> = periods.iter().map(|p| p.to_string()).collect();
        let mut lexical = as_strings.clone();
        lexical.sort();
        assert_eq!(as_strings, lexical);
        assert_eq!(as_strings[0], "2024-12");
        assert_eq!(as_strings[3], "2025-10");
    }
}
