//! Common types used throughout Hourbook

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closed date interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whole days between the two bounds, regardless of their order
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days().abs()
    }

    /// Inclusive on both ends; an inverted range contains nothing
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// What the hour bucketer does with an entry whose label matches no bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedEntries {
    /// Leave the entry out of the chart (it is still counted in `Chart::unmatched`)
    #[default]
    Drop,
    /// Add the entry to the oldest bucket
    #[serde(alias = "fold")]
    FoldIntoOldest,
}

impl UnmatchedEntries {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::FoldIntoOldest => "fold",
        }
    }
}

impl fmt::Display for UnmatchedEntries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnmatchedEntries {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "fold" | "fold_into_oldest" => Ok(Self::FoldIntoOldest),
            other => Err(format!("unknown unmatched-entry policy '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_span_days() {
        let range = DateRange::new(date(2023, 9, 1), date(2023, 9, 14));
        assert_eq!(range.span_days(), 13);

        let inverted = DateRange::new(date(2023, 9, 14), date(2023, 9, 1));
        assert_eq!(inverted.span_days(), 13);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::new(date(2023, 9, 1), date(2023, 9, 14));
        assert!(range.contains(date(2023, 9, 1)));
        assert!(range.contains(date(2023, 9, 14)));
        assert!(!range.contains(date(2023, 9, 15)));

        let inverted = DateRange::new(date(2023, 9, 14), date(2023, 9, 1));
        assert!(!inverted.contains(date(2023, 9, 5)));
    }

    #[test]
    fn test_unmatched_policy_parse() {
        assert_eq!("drop".parse::<UnmatchedEntries>(), Ok(UnmatchedEntries::Drop));
        assert_eq!(
            " Fold ".parse::<UnmatchedEntries>(),
            Ok(UnmatchedEntries::FoldIntoOldest)
        );
        assert!("keep".parse::<UnmatchedEntries>().is_err());
        assert_eq!(UnmatchedEntries::default(), UnmatchedEntries::Drop);
    }
}
