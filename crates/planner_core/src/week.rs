//! ISO week handling.
//!
//! Blocks and sessions are scoped to the Monday-anchored week they were
//! scheduled in. Week boundaries are computed in UTC.

use crate::error::{PlannerError, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Day labels in grid order (day index 0 is Monday).
pub const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// The Monday that starts an ISO week, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekStart(NaiveDate);

impl WeekStart {
    /// Returns the week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = u64::from(date.weekday().num_days_from_monday());
        // Subtracting at most six days only fails at the very start of the calendar.
        Self(date.checked_sub_days(Days::new(offset)).unwrap_or(date))
    }

    /// Returns the week containing the given Unix timestamp (seconds).
    pub fn from_unix(timestamp: i64) -> Result<Self> {
        let datetime = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
            PlannerError::invalid("timestamp", format!("{} is out of range", timestamp))
        })?;
        Ok(Self::containing(datetime.date_naive()))
    }

    /// The Monday itself.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Date of the given day index (0 = Monday) within this week.
    pub fn day(&self, day_index: u8) -> Option<NaiveDate> {
        if usize::from(day_index) >= DAY_NAMES.len() {
            return None;
        }
        self.0.checked_add_days(Days::new(u64::from(day_index)))
    }

    /// The following week.
    pub fn next(&self) -> Self {
        Self(self.0.checked_add_days(Days::new(7)).unwrap_or(self.0))
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for WeekStart {
    type Err = PlannerError;

    /// Parses `YYYY-MM-DD`; the date must be a Monday.
    fn from_str(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| PlannerError::invalid("week start", format!("'{}': {}", s, e)))?;
        let week = Self::containing(date);
        if week.0 != date {
            return Err(PlannerError::invalid(
                "week start",
                format!("{} is not a Monday", s),
            ));
        }
        Ok(week)
    }
}

/// Parses a day argument: an index 0-6 or a day name (`mon`, `Tuesday`, ...).
pub fn parse_day(input: &str) -> Result<u8> {
    let trimmed = input.trim();
    if let Ok(index) = trimmed.parse::<u8>() {
        if usize::from(index) < DAY_NAMES.len() {
            return Ok(index);
        }
        return Err(PlannerError::invalid("day", format!("{} is not in 0..=6", index)));
    }

    let lower = trimmed.to_ascii_lowercase();
    DAY_NAMES
        .iter()
        .position(|name| lower.len() >= 3 && lower.starts_with(&name.to_ascii_lowercase()))
        .and_then(|pos| u8::try_from(pos).ok())
        .ok_or_else(|| PlannerError::invalid("day", format!("unknown day '{}'", input)))
}

/// Returns the current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
