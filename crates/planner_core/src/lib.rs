//! Planner Core Library
//!
//! A weekly habit planner, providing:
//! - Themes, habits and habit groups with completion tracking
//! - A 7-day grid of hourly slots or named buckets
//! - Automatic sessions for strength exercises scheduled back to back
//! - Persistent storage in an embedded database
//!
//! # Quick Start
//!
//! ```
//! use planner_core::{Config, Frequency, GridPos, GroupType, MemoryStore, Planner};
//!
//! let mut planner = Planner::with_store(MemoryStore::new(), Config::default()).unwrap();
//!
//! let theme = planner.create_theme("Fitness").unwrap();
//! let legs = planner
//!     .create_habit_group(theme.id, "Legs", GroupType::StrengthTraining)
//!     .unwrap();
//! let squats = planner
//!     .create_habit(theme.id, "Squats", 3, Frequency::Weekly)
//!     .unwrap();
//! planner.set_habit_group(squats.id, Some(legs.id)).unwrap();
//!
//! // Two touching squat blocks become one session.
//! planner.create_habit_block_at(squats.id, GridPos::new(0, 2)).unwrap();
//! planner.create_habit_block_at(squats.id, GridPos::new(0, 3)).unwrap();
//!
//! let sessions = planner.sessions().unwrap();
//! assert_eq!(sessions.len(), 1);
//! assert_eq!(sessions[0].display_name(), "Session 1");
//! ```
//!
//! # Sessions
//!
//! Sessions are never edited directly. After every change to the grid the
//! planner recomputes the clusters of touching linkable blocks and updates the
//! stored sessions to match; see [`reconcile()`].

mod config;
mod error;
mod graph;
mod grid;
mod ids;
mod lock;
mod palette;
mod planner;
mod reconcile;
pub mod store;
mod summary;
mod types;
mod week;

pub use config::{Config, SessionsConfig, StorageConfig, UserConfig, CONFIG_FILE};
pub use error::{PlannerError, Result};
pub use graph::{
    blocks_adjacent, find_adjacent_groups, is_adjacent, linkable_blocks, AdjacencyMode,
    AdjacentGroup,
};
pub use grid::{GridConfig, Granularity, DEFAULT_BUCKETS, HOURLY_SLOTS};
pub use ids::{BlockId, HabitGroupId, HabitId, SessionGroupId, ThemeId, UserId};
pub use lock::LOCK_FILE;
pub use palette::{next_accent_color, AccentColor, PALETTE};
pub use planner::{GridChange, Planner, PLANNER_DIR};
pub use reconcile::{reconcile, ReconcileReport};
pub use store::{MemoryStore, PlannerStore, RedbStore};
pub use summary::{summarize, HabitProgress, WeekSummary};
pub use types::*;
pub use week::{parse_day, WeekStart, DAY_NAMES};

/// Time provider trait for testing.
///
/// Lets tests pin "now", which decides the current week. Only used when set
/// via [`Planner::with_time_provider`].
pub trait TimeProvider: Send + Sync {
    /// Returns the current Unix timestamp in seconds.
    fn now(&self) -> i64;
}

impl<F> TimeProvider for F
where
    F: Fn() -> i64 + Send + Sync,
{
    fn now(&self) -> i64 {
        self()
    }
}
