//! Record store capabilities.
//!
//! The planner never talks to a database directly. It reads and writes records
//! through these traits, one call per write, with no transaction spanning a
//! reconciliation pass. Listing methods return records in insertion order;
//! the reconciler's tie-breaking depends on it.

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::{RedbStore, STORE_SCHEMA_VERSION};

use crate::error::Result;
use crate::ids::{BlockId, HabitGroupId, HabitId, SessionGroupId, ThemeId, UserId};
use crate::palette::AccentColor;
use crate::types::{
    Block, BlockPatch, Habit, HabitGroup, HabitPatch, SessionGroup, SessionGroupPatch, Theme,
};
use crate::week::WeekStart;

/// Blocks of every user.
pub trait BlockStore {
    /// Blocks of `user` scheduled in `week`, plus blocks with no week at all.
    fn blocks_for_week(&self, user: &UserId, week: WeekStart) -> Result<Vec<Block>>;

    /// Every block of `user`.
    fn blocks_for_user(&self, user: &UserId) -> Result<Vec<Block>>;

    /// Looks up a block.
    fn get_block(&self, id: BlockId) -> Result<Option<Block>>;

    /// Stores a new block.
    fn insert_block(&mut self, block: Block) -> Result<()>;

    /// Applies `patch` and returns the updated block.
    ///
    /// Fails with [`PlannerError::NotFound`](crate::PlannerError::NotFound)
    /// for an unknown id.
    fn update_block(&mut self, id: BlockId, patch: &BlockPatch) -> Result<Block>;

    /// Removes a block.
    fn delete_block(&mut self, id: BlockId) -> Result<()>;
}

/// Habits of every user.
pub trait HabitStore {
    /// Every habit of `user`.
    fn habits_for_user(&self, user: &UserId) -> Result<Vec<Habit>>;

    /// Looks up a habit.
    fn get_habit(&self, id: HabitId) -> Result<Option<Habit>>;

    /// Stores a new habit.
    fn insert_habit(&mut self, habit: Habit) -> Result<()>;

    /// Applies `patch` and returns the updated habit.
    fn update_habit(&mut self, id: HabitId, patch: &HabitPatch) -> Result<Habit>;

    /// Removes a habit.
    fn delete_habit(&mut self, id: HabitId) -> Result<()>;
}

/// Habit groups of every user.
pub trait HabitGroupStore {
    /// Every habit group of `user`.
    fn habit_groups_for_user(&self, user: &UserId) -> Result<Vec<HabitGroup>>;

    /// Looks up a habit group.
    fn get_habit_group(&self, id: HabitGroupId) -> Result<Option<HabitGroup>>;

    /// Stores a new habit group.
    fn insert_habit_group(&mut self, group: HabitGroup) -> Result<()>;

    /// Renames a habit group. Type and link behavior are fixed at creation.
    fn rename_habit_group(&mut self, id: HabitGroupId, name: &str) -> Result<HabitGroup>;

    /// Removes a habit group.
    fn delete_habit_group(&mut self, id: HabitGroupId) -> Result<()>;
}

/// Themes of every user.
pub trait ThemeStore {
    /// Every theme of `user`.
    fn themes_for_user(&self, user: &UserId) -> Result<Vec<Theme>>;

    /// Looks up a theme.
    fn get_theme(&self, id: ThemeId) -> Result<Option<Theme>>;

    /// Stores a new theme.
    fn insert_theme(&mut self, theme: Theme) -> Result<()>;

    /// Renames a theme.
    fn rename_theme(&mut self, id: ThemeId, name: &str) -> Result<Theme>;

    /// Removes a theme.
    fn delete_theme(&mut self, id: ThemeId) -> Result<()>;
}

/// Fields of a session group about to be created. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionGroup {
    /// Owning user.
    pub user_id: UserId,
    /// Week the session belongs to.
    pub week_start_date: WeekStart,
    /// Sequence number within the week.
    pub session_number: u32,
    /// Accent color.
    pub accent_color: AccentColor,
    /// Optional custom name.
    pub custom_name: Option<String>,
    /// Creation time (Unix seconds).
    pub created_at: i64,
}

/// Session groups of every user.
pub trait SessionGroupStore {
    /// Sessions of `user` in `week`, in insertion order.
    fn sessions_for_week(&self, user: &UserId, week: WeekStart) -> Result<Vec<SessionGroup>>;

    /// Looks up a session.
    fn get_session(&self, id: SessionGroupId) -> Result<Option<SessionGroup>>;

    /// Creates a session and returns it with its new id.
    fn create_session(&mut self, session: NewSessionGroup) -> Result<SessionGroup>;

    /// Applies `patch` and returns the updated session.
    fn update_session(&mut self, id: SessionGroupId, patch: &SessionGroupPatch)
        -> Result<SessionGroup>;

    /// Removes a session.
    fn delete_session(&mut self, id: SessionGroupId) -> Result<()>;

    /// One more than the highest session number of `user` in `week`, or 1.
    fn next_session_number(&self, user: &UserId, week: WeekStart) -> Result<u32> {
        let highest = self
            .sessions_for_week(user, week)?
            .iter()
            .map(|s| s.session_number)
            .max()
            .unwrap_or(0);
        Ok(highest.saturating_add(1))
    }
}

/// Every capability the planner needs from its store.
pub trait PlannerStore:
    BlockStore + HabitStore + HabitGroupStore + ThemeStore + SessionGroupStore
{
}

impl<T> PlannerStore for T where
    T: BlockStore + HabitStore + HabitGroupStore + ThemeStore + SessionGroupStore
{
}
