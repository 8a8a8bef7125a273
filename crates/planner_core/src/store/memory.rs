//! In-process record store.
//!
//! Keeps every table in an insertion-ordered map. Used by unit tests and by
//! callers that do not need persistence. Write faults can be injected to
//! exercise partial reconciliation passes.

use super::{
    BlockStore, HabitGroupStore, HabitStore, NewSessionGroup, SessionGroupStore, ThemeStore,
};
use crate::error::{PlannerError, Result};
use crate::ids::{BlockId, HabitGroupId, HabitId, SessionGroupId, ThemeId, UserId};
use crate::types::{
    Block, BlockPatch, Habit, HabitGroup, HabitPatch, SessionGroup, SessionGroupPatch, Theme,
};
use crate::week::WeekStart;
use indexmap::IndexMap;

/// Record store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    themes: IndexMap<ThemeId, Theme>,
    habits: IndexMap<HabitId, Habit>,
    groups: IndexMap<HabitGroupId, HabitGroup>,
    blocks: IndexMap<BlockId, Block>,
    sessions: IndexMap<SessionGroupId, SessionGroup>,
    /// Successful writes so far.
    writes: u64,
    /// Writes still allowed before every write fails.
    write_budget: Option<u64>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Lets `n` more writes succeed, then fails every write with
    /// [`PlannerError::StoreUnavailable`] until [`heal`](Self::heal) is called.
    pub fn fail_writes_after(&mut self, n: u64) {
        self.write_budget = Some(n);
    }

    /// Clears any injected fault.
    pub fn heal(&mut self) {
        self.write_budget = None;
    }

    fn begin_write(&mut self) -> Result<()> {
        match self.write_budget {
            Some(0) => Err(PlannerError::StoreUnavailable(
                "injected write failure".to_string(),
            )),
            Some(ref mut remaining) => {
                *remaining -= 1;
                self.writes += 1;
                Ok(())
            }
            None => {
                self.writes += 1;
                Ok(())
            }
        }
    }
}

impl BlockStore for MemoryStore {
    fn blocks_for_week(&self, user: &UserId, week: WeekStart) -> Result<Vec<Block>> {
        Ok(self
            .blocks
            .values()
            .filter(|b| &b.user_id == user)
            .filter(|b| b.week_start_date.map_or(true, |w| w == week))
            .cloned()
            .collect())
    }

    fn blocks_for_user(&self, user: &UserId) -> Result<Vec<Block>> {
        Ok(self
            .blocks
            .values()
            .filter(|b| &b.user_id == user)
            .cloned()
            .collect())
    }

    fn get_block(&self, id: BlockId) -> Result<Option<Block>> {
        Ok(self.blocks.get(&id).cloned())
    }

    fn insert_block(&mut self, block: Block) -> Result<()> {
        self.begin_write()?;
        self.blocks.insert(block.id, block);
        Ok(())
    }

    fn update_block(&mut self, id: BlockId, patch: &BlockPatch) -> Result<Block> {
        if !self.blocks.contains_key(&id) {
            return Err(PlannerError::not_found("block", id));
        }
        self.begin_write()?;
        let block = self
            .blocks
            .get_mut(&id)
            .ok_or_else(|| PlannerError::not_found("block", id))?;
        patch.apply(block);
        Ok(block.clone())
    }

    fn delete_block(&mut self, id: BlockId) -> Result<()> {
        if !self.blocks.contains_key(&id) {
            return Err(PlannerError::not_found("block", id));
        }
        self.begin_write()?;
        self.blocks.shift_remove(&id);
        Ok(())
    }
}

impl HabitStore for MemoryStore {
    fn habits_for_user(&self, user: &UserId) -> Result<Vec<Habit>> {
        Ok(self
            .habits
            .values()
            .filter(|h| &h.user_id == user)
            .cloned()
            .collect())
    }

    fn get_habit(&self, id: HabitId) -> Result<Option<Habit>> {
        Ok(self.habits.get(&id).cloned())
    }

    fn insert_habit(&mut self, habit: Habit) -> Result<()> {
        self.begin_write()?;
        self.habits.insert(habit.id, habit);
        Ok(())
    }

    fn update_habit(&mut self, id: HabitId, patch: &HabitPatch) -> Result<Habit> {
        if !self.habits.contains_key(&id) {
            return Err(PlannerError::not_found("habit", id));
        }
        self.begin_write()?;
        let habit = self
            .habits
            .get_mut(&id)
            .ok_or_else(|| PlannerError::not_found("habit", id))?;
        patch.apply(habit);
        Ok(habit.clone())
    }

    fn delete_habit(&mut self, id: HabitId) -> Result<()> {
        if !self.habits.contains_key(&id) {
            return Err(PlannerError::not_found("habit", id));
        }
        self.begin_write()?;
        self.habits.shift_remove(&id);
        Ok(())
    }
}

impl HabitGroupStore for MemoryStore {
    fn habit_groups_for_user(&self, user: &UserId) -> Result<Vec<HabitGroup>> {
        Ok(self
            .groups
            .values()
            .filter(|g| &g.user_id == user)
            .cloned()
            .collect())
    }

    fn get_habit_group(&self, id: HabitGroupId) -> Result<Option<HabitGroup>> {
        Ok(self.groups.get(&id).cloned())
    }

    fn insert_habit_group(&mut self, group: HabitGroup) -> Result<()> {
        self.begin_write()?;
        self.groups.insert(group.id, group);
        Ok(())
    }

    fn rename_habit_group(&mut self, id: HabitGroupId, name: &str) -> Result<HabitGroup> {
        if !self.groups.contains_key(&id) {
            return Err(PlannerError::not_found("habit group", id));
        }
        self.begin_write()?;
        let group = self
            .groups
            .get_mut(&id)
            .ok_or_else(|| PlannerError::not_found("habit group", id))?;
        group.name = name.to_string();
        Ok(group.clone())
    }

    fn delete_habit_group(&mut self, id: HabitGroupId) -> Result<()> {
        if !self.groups.contains_key(&id) {
            return Err(PlannerError::not_found("habit group", id));
        }
        self.begin_write()?;
        self.groups.shift_remove(&id);
        Ok(())
    }
}

impl ThemeStore for MemoryStore {
    fn themes_for_user(&self, user: &UserId) -> Result<Vec<Theme>> {
        Ok(self
            .themes
            .values()
            .filter(|t| &t.user_id == user)
            .cloned()
            .collect())
    }

    fn get_theme(&self, id: ThemeId) -> Result<Option<Theme>> {
        Ok(self.themes.get(&id).cloned())
    }

    fn insert_theme(&mut self, theme: Theme) -> Result<()> {
        self.begin_write()?;
        self.themes.insert(theme.id, theme);
        Ok(())
    }

    fn rename_theme(&mut self, id: ThemeId, name: &str) -> Result<Theme> {
        if !self.themes.contains_key(&id) {
            return Err(PlannerError::not_found("theme", id));
        }
        self.begin_write()?;
        let theme = self
            .themes
            .get_mut(&id)
            .ok_or_else(|| PlannerError::not_found("theme", id))?;
        theme.name = name.to_string();
        Ok(theme.clone())
    }

    fn delete_theme(&mut self, id: ThemeId) -> Result<()> {
        if !self.themes.contains_key(&id) {
            return Err(PlannerError::not_found("theme", id));
        }
        self.begin_write()?;
        self.themes.shift_remove(&id);
        Ok(())
    }
}

impl SessionGroupStore for MemoryStore {
    fn sessions_for_week(&self, user: &UserId, week: WeekStart) -> Result<Vec<SessionGroup>> {
        Ok(self
            .sessions
            .values()
            .filter(|s| &s.user_id == user && s.week_start_date == week)
            .cloned()
            .collect())
    }

    fn get_session(&self, id: SessionGroupId) -> Result<Option<SessionGroup>> {
        Ok(self.sessions.get(&id).cloned())
    }

    fn create_session(&mut self, session: NewSessionGroup) -> Result<SessionGroup> {
        self.begin_write()?;
        let created = SessionGroup {
            id: SessionGroupId::new(),
            user_id: session.user_id,
            week_start_date: session.week_start_date,
            session_number: session.session_number,
            custom_name: session.custom_name,
            accent_color: session.accent_color,
            created_at: session.created_at,
        };
        self.sessions.insert(created.id, created.clone());
        Ok(created)
    }

    fn update_session(
        &mut self,
        id: SessionGroupId,
        patch: &SessionGroupPatch,
    ) -> Result<SessionGroup> {
        if !self.sessions.contains_key(&id) {
            return Err(PlannerError::not_found("session", id));
        }
        self.begin_write()?;
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| PlannerError::not_found("session", id))?;
        patch.apply(session);
        Ok(session.clone())
    }

    fn delete_session(&mut self, id: SessionGroupId) -> Result<()> {
        if !self.sessions.contains_key(&id) {
            return Err(PlannerError::not_found("session", id));
        }
        self.begin_write()?;
        self.sessions.shift_remove(&id);
        Ok(())
    }
}
