//! Shared primitive types used across the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type CustomerId = i64;
pub type CityId = i64;
pub type StateId = i64;
pub type LoanId = i64;
pub type DefaultId = i64;
pub type IndicatorId = i64;

/// The canonical run identifier.
pub type RunId = String;

/// A reporting quarter such as `2024-Q3`.
/// Ordered by year, then quarter number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter {
    pub year: i32,
    pub quarter: u8,
}

impl Quarter {
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

impl FromStr for Quarter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, q) = s
            .trim()
            .split_once("-Q")
            .ok_or_else(|| format!("quarter '{s}' is not in YYYY-Qn form"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("quarter '{s}' has a non-numeric year"))?;
        let quarter: u8 = q
            .parse()
            .map_err(|_| format!("quarter '{s}' has a non-numeric quarter"))?;
        Quarter::new(year, quarter).ok_or_else(|| format!("quarter '{s}' is out of range 1-4"))
    }
}

impl TryFrom<String> for Quarter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quarter> for String {
    fn from(q: Quarter) -> Self {
        q.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarters_order_by_year_then_quarter() {
        let a: Quarter = "2023-Q4".parse().unwrap();
        let b: Quarter = "2024-Q1".parse().unwrap();
        let c: Quarter = "2024-Q3".parse().unwrap();
        assert!(a < b && b < c);
        assert_eq!(c.to_string(), "2024-Q3");
    }

    #[test]
    fn malformed_quarters_are_rejected() {
        assert!("2024Q1".parse::<Quarter>().is_err());
        assert!("2024-Q5".parse::<Quarter>().is_err());
        assert!("abcd-Q1".parse::<Quarter>().is_err());
    }
}
