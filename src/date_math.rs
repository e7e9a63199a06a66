//! Calendar arithmetic on dates, never on instants.

use chrono::{Months, NaiveDate};
use hourglass_rs::SafeTimeProvider;

use crate::errors::{CashKickError, Result};

/// `n` whole calendar months after `date`
///
/// A day-of-month missing from the target month clamps to that month's last
/// day, so Jan 31 plus one month is Feb 29 in a leap year and Feb 28 otherwise.
/// Negative `n` moves backwards with the same clamping.
pub fn add_months(date: NaiveDate, n: i32) -> Result<NaiveDate> {
    let shifted = if n >= 0 {
        date.checked_add_months(Months::new(n.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(n.unsigned_abs()))
    };

    shifted.ok_or_else(|| CashKickError::InvalidDate {
        message: format!("{date} shifted by {n} months is out of range"),
    })
}

/// current calendar date of the time provider
pub fn today(time_provider: &SafeTimeProvider) -> NaiveDate {
    time_provider.now().date_naive()
}

/// whole days from `from` to `to`, negative when `to` is earlier
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// `date - today` in whole days; past dates are zero or negative, never clamped
pub fn days_until(date: NaiveDate, time_provider: &SafeTimeProvider) -> i64 {
    days_between(today(time_provider), date)
}

/// serde adapter for calendar dates
///
/// Writes ISO `YYYY-MM-DD`. Reads ISO, `Dec 31, 2024` and `12/31/2024`.
pub(crate) mod calendar_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%b %d, %Y", "%m/%d/%Y"];

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("unrecognised date: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    }
}
