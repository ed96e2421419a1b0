use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ValueParseError;

wire_enum!(
    /// Response encoding for report endpoints. `csv` bodies are raw text.
    #[derive(Default)]
    ReportFormat, "format" {
        #[default]
        Json => "json",
        Csv => "csv",
    }
);

wire_enum!(
    /// Aggregation key for period reports.
    #[derive(Default)]
    GroupBy, "group_by" {
        #[default]
        Total => "total",
        Model => "model",
        Day => "day",
        ModelDay => "model_day",
    }
);

/// A calendar day in `YYYY-MM-DD` form as the report endpoints expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportDate(NaiveDate);

impl ReportDate {
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today in the local timezone.
    #[must_use]
    pub fn today() -> Self {
        Self(chrono::Local::now().date_naive())
    }

    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// The day `days` before this one, saturating at the calendar minimum.
    #[must_use]
    pub fn days_before(self, days: u32) -> Self {
        Self(
            self.0
                .checked_sub_days(chrono::Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
        )
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for ReportDate {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValueParseError::new("date", trimmed, "YYYY-MM-DD"))
    }
}

impl TryFrom<String> for ReportDate {
    type Error = ValueParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReportDate> for String {
    fn from(value: ReportDate) -> Self {
        value.to_string()
    }
}
