//! Planner handle providing the main API.

use crate::config::Config;
use crate::error::{PlannerError, Result};
use crate::grid::Granularity;
use crate::ids::{BlockId, HabitGroupId, HabitId, SessionGroupId, ThemeId, UserId};
use crate::lock::{self, LockGuard};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::store::{PlannerStore, RedbStore};
use crate::summary::{summarize, WeekSummary};
use crate::types::{
    Block, BlockLocation, BlockPatch, Frequency, GridPos, GroupType, Habit, HabitGroup,
    HabitPatch, SessionGroup, SessionGroupPatch, Theme,
};
use crate::week::{current_timestamp, WeekStart};
use crate::TimeProvider;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the planner directory created by [`Planner::init`].
pub const PLANNER_DIR: &str = ".planner";

/// Result of a grid change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridChange {
    /// Blocks moved back to the tray because their slot left the grid.
    pub moved_to_tray: Vec<BlockId>,
    /// Reconciliation pass run after the change.
    pub report: ReconcileReport,
}

/// Planner handle.
///
/// Owns the record store, the configuration and the clock. Every operation
/// that changes which blocks sit where, or which blocks are linkable, runs a
/// reconciliation pass before returning.
pub struct Planner<S = RedbStore> {
    store: S,
    config: Config,
    user: UserId,
    /// Planner directory on disk; `None` for a planner over a caller-supplied store.
    planner_dir: Option<PathBuf>,
    /// Time provider for testing (None = use system time).
    time_provider: Option<Arc<dyn TimeProvider>>,
    /// Held for the lifetime of an on-disk planner.
    _lock: Option<LockGuard>,
}

impl Planner<RedbStore> {
    /// Creates a planner directory under `root` and opens it.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::AlreadyInitialized`] if `root` already has one.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use planner_core::Planner;
    ///
    /// let planner = Planner::init(".", Some("alice")).unwrap();
    /// ```
    pub fn init(root: impl AsRef<Path>, user: Option<&str>) -> Result<Self> {
        let planner_dir = root.as_ref().join(PLANNER_DIR);
        if planner_dir.exists() {
            return Err(PlannerError::AlreadyInitialized(planner_dir));
        }
        fs::create_dir_all(&planner_dir)?;

        let mut config = Config::default();
        if let Some(user) = user {
            config.user.id = UserId::new(user)?.to_string();
        }
        config.save(&planner_dir)?;
        fs::write(planner_dir.join(".gitignore"), "LOCK\n")?;

        info!(dir = %planner_dir.display(), user = %config.user.id, "initialized planner");
        Self::open_dir(planner_dir, config)
    }

    /// Opens the planner directory under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::NotInitialized`] if there is none, or
    /// [`PlannerError::LockHeld`] if another process has it open.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let planner_dir = root.as_ref().join(PLANNER_DIR);
        if !planner_dir.is_dir() {
            return Err(PlannerError::NotInitialized(root.as_ref().to_path_buf()));
        }
        let config = Config::load(&planner_dir)?;
        Self::open_dir(planner_dir, config)
    }

    fn open_dir(planner_dir: PathBuf, config: Config) -> Result<Self> {
        let guard = lock::acquire(&planner_dir)?;
        let store = RedbStore::open(planner_dir.join(&config.storage.database))?;
        let user = config.user.user_id()?;
        Ok(Self {
            store,
            config,
            user,
            planner_dir: Some(planner_dir),
            time_provider: None,
            _lock: Some(guard),
        })
    }
}

impl<S: PlannerStore> Planner<S> {
    /// Builds a planner over an existing store. Nothing is written to disk.
    pub fn with_store(store: S, config: Config) -> Result<Self> {
        config.validate()?;
        let user = config.user.user_id()?;
        Ok(Self {
            store,
            config,
            user,
            planner_dir: None,
            time_provider: None,
            _lock: None,
        })
    }

    /// Sets a custom time provider for testing.
    pub fn with_time_provider(mut self, provider: impl TimeProvider + 'static) -> Self {
        self.time_provider = Some(Arc::new(provider));
        self
    }

    /// The record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the record store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Owner of every record this planner touches.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Planner directory, if on disk.
    pub fn planner_dir(&self) -> Option<&Path> {
        self.planner_dir.as_deref()
    }

    /// Current Unix time in seconds.
    pub fn now(&self) -> i64 {
        match &self.time_provider {
            Some(provider) => provider.now(),
            None => current_timestamp(),
        }
    }

    /// Week containing [`now`](Self::now).
    pub fn current_week(&self) -> Result<WeekStart> {
        WeekStart::from_unix(self.now())
    }

    // =========================================================================
    // Themes
    // =========================================================================

    /// Creates a theme.
    pub fn create_theme(&mut self, name: &str) -> Result<Theme> {
        let theme = Theme {
            id: ThemeId::new(),
            user_id: self.user.clone(),
            name: required("theme name", name)?,
            created_at: self.now(),
        };
        self.store.insert_theme(theme.clone())?;
        debug!(theme = %theme.id, name = %theme.name, "created theme");
        Ok(theme)
    }

    /// Renames a theme.
    pub fn rename_theme(&mut self, id: ThemeId, name: &str) -> Result<Theme> {
        let name = required("theme name", name)?;
        self.theme(id)?;
        self.store.rename_theme(id, &name)
    }

    /// Deletes a theme with its habits and habit groups.
    ///
    /// Blocks of the deleted habits stay, as plain blocks.
    pub fn delete_theme(&mut self, id: ThemeId) -> Result<ReconcileReport> {
        self.theme(id)?;

        let habits: Vec<HabitId> = self
            .store
            .habits_for_user(&self.user)?
            .into_iter()
            .filter(|h| h.theme_id == id)
            .map(|h| h.id)
            .collect();
        for habit in habits {
            self.remove_habit(habit)?;
        }

        let groups: Vec<HabitGroupId> = self
            .store
            .habit_groups_for_user(&self.user)?
            .into_iter()
            .filter(|g| g.theme_id == id)
            .map(|g| g.id)
            .collect();
        for group in groups {
            self.remove_habit_group(group)?;
        }

        self.store.delete_theme(id)?;
        info!(theme = %id, "deleted theme");
        self.reconcile()
    }

    /// Themes of the user, in creation order.
    pub fn themes(&self) -> Result<Vec<Theme>> {
        self.store.themes_for_user(&self.user)
    }

    // =========================================================================
    // Habits
    // =========================================================================

    /// Creates a habit in `theme`.
    ///
    /// The name must not be blank, and the target must be positive unless the
    /// frequency is `none`.
    pub fn create_habit(
        &mut self,
        theme: ThemeId,
        name: &str,
        target_count: u32,
        frequency: Frequency,
    ) -> Result<Habit> {
        let name = required("habit name", name)?;
        if frequency != Frequency::None && target_count == 0 {
            return Err(PlannerError::invalid(
                "target",
                format!("must be greater than zero for a {} habit", frequency),
            ));
        }
        self.theme(theme)?;

        let habit = Habit {
            id: HabitId::new(),
            theme_id: theme,
            user_id: self.user.clone(),
            name,
            target_count,
            done_count: 0,
            last_done_at: None,
            frequency,
            habit_group_id: None,
            created_at: self.now(),
        };
        self.store.insert_habit(habit.clone())?;
        debug!(habit = %habit.id, name = %habit.name, "created habit");
        Ok(habit)
    }

    /// Records one completion.
    pub fn increment_habit(&mut self, id: HabitId) -> Result<Habit> {
        let habit = self.habit(id)?;
        let patch = HabitPatch {
            done_count: Some(habit.done_count.saturating_add(1)),
            last_done_at: Some(Some(self.now())),
            ..Default::default()
        };
        self.store.update_habit(id, &patch)
    }

    /// Takes back one completion. The count never drops below zero.
    pub fn decrement_habit(&mut self, id: HabitId) -> Result<Habit> {
        let habit = self.habit(id)?;
        let patch = HabitPatch {
            done_count: Some(habit.done_count.saturating_sub(1)),
            ..Default::default()
        };
        self.store.update_habit(id, &patch)
    }

    /// Moves a habit into a group, or out of any group.
    ///
    /// Changes which blocks are linkable, so sessions are reconciled.
    pub fn set_habit_group(
        &mut self,
        habit: HabitId,
        group: Option<HabitGroupId>,
    ) -> Result<ReconcileReport> {
        self.habit(habit)?;
        if let Some(group) = group {
            self.habit_group(group)?;
        }
        let patch = HabitPatch {
            habit_group_id: Some(group),
            ..Default::default()
        };
        self.store.update_habit(habit, &patch)?;
        self.reconcile()
    }

    /// Deletes a habit. Its blocks become plain, uncompleted blocks.
    pub fn delete_habit(&mut self, id: HabitId) -> Result<ReconcileReport> {
        self.habit(id)?;
        self.remove_habit(id)?;
        self.reconcile()
    }

    fn remove_habit(&mut self, id: HabitId) -> Result<()> {
        let unlink = BlockPatch {
            is_habit_block: Some(false),
            habit_id: Some(None),
            completed: Some(false),
            ..Default::default()
        };
        let blocks: Vec<BlockId> = self
            .store
            .blocks_for_user(&self.user)?
            .into_iter()
            .filter(|b| b.habit_id == Some(id))
            .map(|b| b.id)
            .collect();
        for block in &blocks {
            self.store.update_block(*block, &unlink)?;
        }
        self.store.delete_habit(id)?;
        info!(habit = %id, unlinked_blocks = blocks.len(), "deleted habit");
        Ok(())
    }

    /// Habits of the user, in creation order.
    pub fn habits(&self) -> Result<Vec<Habit>> {
        self.store.habits_for_user(&self.user)
    }

    /// Starts a new week: every done count goes to zero and every block is
    /// marked not completed.
    pub fn reset_week(&mut self) -> Result<()> {
        let reset = HabitPatch {
            done_count: Some(0),
            ..Default::default()
        };
        for habit in self.store.habits_for_user(&self.user)? {
            if habit.done_count != 0 {
                self.store.update_habit(habit.id, &reset)?;
            }
        }

        let uncheck = BlockPatch {
            completed: Some(false),
            ..Default::default()
        };
        for block in self.store.blocks_for_user(&self.user)? {
            if block.completed {
                self.store.update_block(block.id, &uncheck)?;
            }
        }
        info!("reset weekly progress");
        Ok(())
    }

    // =========================================================================
    // Habit groups
    // =========================================================================

    /// Creates a habit group. Its link behavior follows `group_type`.
    pub fn create_habit_group(
        &mut self,
        theme: ThemeId,
        name: &str,
        group_type: GroupType,
    ) -> Result<HabitGroup> {
        let name = required("group name", name)?;
        self.theme(theme)?;
        let group = HabitGroup::new(theme, self.user.clone(), name, group_type, self.now());
        self.store.insert_habit_group(group.clone())?;
        debug!(group = %group.id, group_type = %group_type, "created habit group");
        Ok(group)
    }

    /// Renames a habit group.
    pub fn rename_habit_group(&mut self, id: HabitGroupId, name: &str) -> Result<HabitGroup> {
        let name = required("group name", name)?;
        self.habit_group(id)?;
        self.store.rename_habit_group(id, &name)
    }

    /// Deletes a habit group. Member habits stay, without a group.
    pub fn delete_habit_group(&mut self, id: HabitGroupId) -> Result<ReconcileReport> {
        self.habit_group(id)?;
        self.remove_habit_group(id)?;
        self.reconcile()
    }

    fn remove_habit_group(&mut self, id: HabitGroupId) -> Result<()> {
        let clear = HabitPatch {
            habit_group_id: Some(None),
            ..Default::default()
        };
        let members: Vec<HabitId> = self
            .store
            .habits_for_user(&self.user)?
            .into_iter()
            .filter(|h| h.habit_group_id == Some(id))
            .map(|h| h.id)
            .collect();
        for habit in members {
            self.store.update_habit(habit, &clear)?;
        }
        self.store.delete_habit_group(id)?;
        info!(group = %id, "deleted habit group");
        Ok(())
    }

    /// Habit groups of the user, in creation order.
    pub fn habit_groups(&self) -> Result<Vec<HabitGroup>> {
        self.store.habit_groups_for_user(&self.user)
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// Creates a plain block in the tray.
    pub fn create_block(&mut self, label: &str, hashtag: Option<&str>) -> Result<Block> {
        let mut block = Block::new(self.user.clone(), required("label", label)?, self.now());
        block.hashtag = hashtag.and_then(normalize_hashtag);
        self.store.insert_block(block.clone())?;
        debug!(block = %block.id, "created block");
        Ok(block)
    }

    /// Places a new occurrence of `habit` on the grid.
    ///
    /// The block is labelled after the habit and tagged with its theme.
    pub fn create_habit_block_at(
        &mut self,
        habit: HabitId,
        pos: GridPos,
    ) -> Result<(Block, ReconcileReport)> {
        let habit = self.habit(habit)?;
        self.config.grid.check(pos)?;
        let theme = self.store.get_theme(habit.theme_id)?;

        let mut block = Block::new(
            self.user.clone(),
            format!("Habit: {}", habit.name),
            self.now(),
        );
        block.is_habit_block = true;
        block.habit_id = Some(habit.id);
        block.hashtag = theme.and_then(|t| normalize_hashtag(&t.name));
        block.location = BlockLocation::Slot(pos);
        block.week_start_date = Some(self.current_week()?);
        let id = block.id;
        self.store.insert_block(block)?;
        debug!(block = %id, habit = %habit.id, %pos, "placed habit block");

        let report = self.reconcile()?;
        Ok((self.block(id)?, report))
    }

    /// Moves a block to a grid cell in the current week.
    pub fn move_block(&mut self, id: BlockId, pos: GridPos) -> Result<ReconcileReport> {
        self.block(id)?;
        self.config.grid.check(pos)?;
        let week = self.current_week()?;
        self.store
            .update_block(id, &BlockPatch::location(BlockLocation::Slot(pos), Some(week)))?;
        debug!(block = %id, %pos, "moved block");
        self.reconcile()
    }

    /// Moves a block back to the tray.
    pub fn unschedule_block(&mut self, id: BlockId) -> Result<ReconcileReport> {
        self.block(id)?;
        self.store
            .update_block(id, &BlockPatch::location(BlockLocation::Unscheduled, None))?;
        debug!(block = %id, "unscheduled block");
        self.reconcile()
    }

    /// Deletes a block.
    pub fn delete_block(&mut self, id: BlockId) -> Result<ReconcileReport> {
        self.block(id)?;
        self.store.delete_block(id)?;
        debug!(block = %id, "deleted block");
        self.reconcile()
    }

    /// Checks or unchecks a habit block, counting the completion on its habit.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::NotAHabitBlock`] for plain blocks.
    pub fn toggle_block_completion(&mut self, id: BlockId) -> Result<Block> {
        let block = self.block(id)?;
        if !block.is_habit_block {
            return Err(PlannerError::NotAHabitBlock(id.to_string()));
        }
        let completed = !block.completed;
        let updated = self.store.update_block(
            id,
            &BlockPatch {
                completed: Some(completed),
                ..Default::default()
            },
        )?;

        let habit = match block.habit_id {
            Some(habit_id) => self.store.get_habit(habit_id)?,
            None => None,
        };
        match habit {
            Some(habit) if completed => {
                self.increment_habit(habit.id)?;
            }
            Some(habit) => {
                self.decrement_habit(habit.id)?;
            }
            None => warn!(block = %id, "completed block has no habit to count against"),
        }
        Ok(updated)
    }

    /// Blocks of the current week, plus the tray.
    pub fn week_blocks(&self) -> Result<Vec<Block>> {
        self.store.blocks_for_week(&self.user, self.current_week()?)
    }

    /// Completion progress of the current week.
    pub fn week_summary(&self) -> Result<WeekSummary> {
        let week = self.current_week()?;
        let blocks = self.store.blocks_for_week(&self.user, week)?;
        let habits = self.store.habits_for_user(&self.user)?;
        Ok(summarize(week, &blocks, &habits))
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Sessions of the current week, by number.
    pub fn sessions(&self) -> Result<Vec<SessionGroup>> {
        let mut sessions = self
            .store
            .sessions_for_week(&self.user, self.current_week()?)?;
        sessions.sort_by_key(|s| s.session_number);
        Ok(sessions)
    }

    /// Sets or clears a session's custom name. A blank name clears it.
    pub fn rename_session(
        &mut self,
        id: SessionGroupId,
        name: Option<&str>,
    ) -> Result<SessionGroup> {
        let session = self
            .store
            .get_session(id)?
            .filter(|s| s.user_id == self.user)
            .ok_or_else(|| PlannerError::not_found("session", id))?;
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        debug!(session = %session.id, name = ?name, "renaming session");
        self.store.update_session(
            id,
            &SessionGroupPatch {
                custom_name: Some(name),
                ..Default::default()
            },
        )
    }

    /// Runs a reconciliation pass for the current week.
    pub fn reconcile(&mut self) -> Result<ReconcileReport> {
        let now = self.now();
        let mode = self.config.sessions.adjacency_mode();
        reconcile(&mut self.store, &self.user, now, mode)
    }

    // =========================================================================
    // Grid
    // =========================================================================

    /// Switches between hourly slots and buckets.
    pub fn set_granularity(&mut self, granularity: Granularity) -> Result<GridChange> {
        self.config.grid.granularity = granularity;
        self.save_config()?;
        self.apply_grid_change()
    }

    /// Appends a bucket. A blank name becomes "New bucket".
    pub fn add_bucket(&mut self, name: &str) -> Result<()> {
        self.config.grid.add_bucket(name);
        self.save_config()
    }

    /// Renames the bucket at `index`.
    pub fn rename_bucket(&mut self, index: usize, name: &str) -> Result<()> {
        self.config.grid.rename_bucket(index, name)?;
        self.save_config()
    }

    /// Removes the bucket at `index`.
    pub fn remove_bucket(&mut self, index: usize) -> Result<GridChange> {
        let removed = self.config.grid.remove_bucket(index)?;
        debug!(bucket = %removed, "removed bucket");
        self.save_config()?;
        self.apply_grid_change()
    }

    fn apply_grid_change(&mut self) -> Result<GridChange> {
        let blocks = self.store.blocks_for_user(&self.user)?;
        let moved_to_tray: Vec<BlockId> = self
            .config
            .grid
            .out_of_range(&blocks)
            .into_iter()
            .map(|b| b.id)
            .collect();

        let to_tray = BlockPatch::location(BlockLocation::Unscheduled, None);
        for id in &moved_to_tray {
            self.store.update_block(*id, &to_tray)?;
        }
        if !moved_to_tray.is_empty() {
            warn!(
                count = moved_to_tray.len(),
                "moved blocks outside the grid back to the tray"
            );
        }

        let report = self.reconcile()?;
        Ok(GridChange {
            moved_to_tray,
            report,
        })
    }

    fn save_config(&self) -> Result<()> {
        match &self.planner_dir {
            Some(dir) => self.config.save(dir),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Looks up a theme of this user.
    pub fn theme(&self, id: ThemeId) -> Result<Theme> {
        self.store
            .get_theme(id)?
            .filter(|t| t.user_id == self.user)
            .ok_or_else(|| PlannerError::not_found("theme", id))
    }

    /// Looks up a habit of this user.
    pub fn habit(&self, id: HabitId) -> Result<Habit> {
        self.store
            .get_habit(id)?
            .filter(|h| h.user_id == self.user)
            .ok_or_else(|| PlannerError::not_found("habit", id))
    }

    /// Looks up a habit group of this user.
    pub fn habit_group(&self, id: HabitGroupId) -> Result<HabitGroup> {
        self.store
            .get_habit_group(id)?
            .filter(|g| g.user_id == self.user)
            .ok_or_else(|| PlannerError::not_found("habit group", id))
    }

    /// Looks up a block of this user.
    pub fn block(&self, id: BlockId) -> Result<Block> {
        self.store
            .get_block(id)?
            .filter(|b| b.user_id == self.user)
            .ok_or_else(|| PlannerError::not_found("block", id))
    }
}

/// Trims `value`, rejecting blank input.
fn required(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trims a hashtag and drops a leading `#`. Blank tags become `None`.
fn normalize_hashtag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    let tag = tag.strip_prefix('#').unwrap_or(tag).trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}
