//! Grid geometry: seven days by a configurable number of time slots.

use crate::error::{PlannerError, Result};
use crate::types::{Block, GridPos};
use crate::week::DAY_NAMES;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hour labels used in hourly mode.
pub const HOURLY_SLOTS: [&str; 17] = [
    "6:00 AM", "7:00 AM", "8:00 AM", "9:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM",
    "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM", "6:00 PM", "7:00 PM", "8:00 PM", "9:00 PM",
    "10:00 PM",
];

/// Buckets a fresh planner starts with.
pub const DEFAULT_BUCKETS: [&str; 5] = ["Early morning", "Morning", "Afternoon", "Evening", "Night"];

/// Name given to a bucket added without a name.
const NEW_BUCKET_NAME: &str = "New bucket";

/// Name of the bucket left behind when the last one is removed.
const FALLBACK_BUCKET_NAME: &str = "Time";

/// Time resolution of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One slot per hour, 6 AM to 10 PM.
    Hourly,
    /// User-named buckets ("Morning", "Evening", ...).
    Buckets,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Hourly => f.write_str("hourly"),
            Granularity::Buckets => f.write_str("buckets"),
        }
    }
}

impl FromStr for Granularity {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" | "hours" => Ok(Granularity::Hourly),
            "buckets" | "bucket" => Ok(Granularity::Buckets),
            other => Err(PlannerError::invalid(
                "granularity",
                format!("expected 'hourly' or 'buckets', got '{}'", other),
            )),
        }
    }
}

/// Grid layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Active time resolution.
    pub granularity: Granularity,
    /// Bucket names, used when `granularity` is `buckets`.
    pub buckets: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Hourly,
            buckets: DEFAULT_BUCKETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GridConfig {
    /// Labels of the time slots in the active mode.
    pub fn slot_labels(&self) -> Vec<String> {
        match self.granularity {
            Granularity::Hourly => HOURLY_SLOTS.iter().map(|s| s.to_string()).collect(),
            Granularity::Buckets => self.buckets.clone(),
        }
    }

    /// Number of time slots per day in the active mode.
    pub fn slot_count(&self) -> u16 {
        let count = match self.granularity {
            Granularity::Hourly => HOURLY_SLOTS.len(),
            Granularity::Buckets => self.buckets.len(),
        };
        u16::try_from(count).unwrap_or(u16::MAX)
    }

    /// Whether `pos` lies on the grid.
    pub fn contains(&self, pos: GridPos) -> bool {
        usize::from(pos.day_index) < DAY_NAMES.len() && pos.time_index < self.slot_count()
    }

    /// Fails with [`PlannerError::SlotOutOfRange`] if `pos` is off the grid.
    pub fn check(&self, pos: GridPos) -> Result<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(PlannerError::SlotOutOfRange {
                day_index: pos.day_index,
                time_index: pos.time_index,
                slot_count: self.slot_count(),
            })
        }
    }

    /// Appends a bucket. A blank name becomes "New bucket".
    pub fn add_bucket(&mut self, name: &str) {
        let name = name.trim();
        self.buckets.push(if name.is_empty() {
            NEW_BUCKET_NAME.to_string()
        } else {
            name.to_string()
        });
    }

    /// Renames the bucket at `index`.
    pub fn rename_bucket(&mut self, index: usize, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::invalid("bucket name", "must not be empty"));
        }
        let count = self.buckets.len();
        let bucket = self.buckets.get_mut(index).ok_or_else(|| {
            PlannerError::invalid("bucket", format!("index {} out of range (0..{})", index, count))
        })?;
        *bucket = name.to_string();
        Ok(())
    }

    /// Removes the bucket at `index`. Removing the last bucket leaves a single
    /// bucket named "Time".
    pub fn remove_bucket(&mut self, index: usize) -> Result<String> {
        if index >= self.buckets.len() {
            return Err(PlannerError::invalid(
                "bucket",
                format!("index {} out of range (0..{})", index, self.buckets.len()),
            ));
        }
        let removed = self.buckets.remove(index);
        if self.buckets.is_empty() {
            self.buckets.push(FALLBACK_BUCKET_NAME.to_string());
        }
        Ok(removed)
    }

    /// Validates a loaded configuration.
    pub fn validate(&self) -> Result<()> {
        if self.buckets.is_empty() {
            return Err(PlannerError::ConfigError(
                "grid.buckets must contain at least one bucket".to_string(),
            ));
        }
        if self.buckets.len() > usize::from(u16::MAX) {
            return Err(PlannerError::ConfigError("grid.buckets has too many entries".to_string()));
        }
        Ok(())
    }

    /// Scheduled blocks whose slot no longer fits this grid.
    pub fn out_of_range<'a>(&self, blocks: &'a [Block]) -> Vec<&'a Block> {
        blocks
            .iter()
            .filter(|block| block.slot().is_some_and(|pos| !self.contains(pos)))
            .collect()
    }
}
