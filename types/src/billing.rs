//! Billing vocabulary shared by plan, customer and login requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValueParseError;

wire_enum!(
    /// The kind of entity a customer or plan assignment is bound to.
    EntityType, "entity_type" {
        User => "user",
        Team => "team",
    }
);

wire_enum!(
    /// Billing policy template kind.
    PlanType, "plan type" {
        DailyLimit => "daily_limit",
        Usage => "usage",
    }
);

wire_enum!(
    /// What happens to a request once the daily limit is spent.
    #[derive(Default)]
    OverflowPolicy, "overflow_policy" {
        #[default]
        Block => "block",
        Grace => "grace",
        Degrade => "degrade",
    }
);

wire_enum!(
    #[derive(Default)]
    BillingCycle, "billing_cycle" {
        #[default]
        Monthly => "monthly",
        Weekly => "weekly",
    }
);

wire_enum!(
    /// Unit a price rule charges by.
    #[derive(Default)]
    PriceUnit, "unit" {
        #[default]
        Token => "token",
        Request => "request",
        Minute => "minute",
        Image => "image",
    }
);

wire_enum!(
    /// OAuth provider used for the social login test flow.
    #[derive(Default)]
    SocialProvider, "provider" {
        #[default]
        Google => "google",
        Github => "github",
    }
);

/// Daily-limit reset time of day, `HH:MM` on a 24h clock. Defaults to midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResetTime {
    hour: u8,
    minute: u8,
}

impl ResetTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValueParseError> {
        if hour > 23 || minute > 59 {
            return Err(ValueParseError::new(
                "reset_time",
                &format!("{hour:02}:{minute:02}"),
                "HH:MM",
            ));
        }
        Ok(Self { hour, minute })
    }

    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }
}

impl fmt::Display for ResetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ResetTime {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ValueParseError::new("reset_time", trimmed, "HH:MM");
        let (hour, minute) = trimmed.split_once(':').ok_or_else(invalid)?;
        // The backend pattern is exactly two digits on each side.
        if hour.len() != 2
            || minute.len() != 2
            || !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let hour = hour.parse::<u8>().map_err(|_| invalid())?;
        let minute = minute.parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ResetTime {
    type Error = ValueParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResetTime> for String {
    fn from(value: ResetTime) -> Self {
        value.to_string()
    }
}
