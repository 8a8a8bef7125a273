//! Core data model: themes, habits, habit groups, blocks and session groups.

use crate::ids::{BlockId, HabitGroupId, HabitId, SessionGroupId, ThemeId, UserId};
use crate::palette::AccentColor;
use crate::week::WeekStart;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Themes and habits
// =============================================================================

/// A user-defined category grouping related habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme identifier.
    pub id: ThemeId,
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Creation time (Unix seconds).
    pub created_at: i64,
}

/// How often a habit's target applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Target per day.
    Daily,
    /// Target per week.
    Weekly,
    /// Target per month.
    Monthly,
    /// No target; the habit is only counted.
    None,
}

impl Frequency {
    /// Returns the lowercase name used in config and CLI arguments.
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::None => "none",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = crate::PlannerError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "none" => Ok(Frequency::None),
            other => Err(crate::PlannerError::invalid(
                "frequency",
                format!("unknown frequency '{}'", other),
            )),
        }
    }
}

/// A tracked recurring action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    /// Habit identifier.
    pub id: HabitId,
    /// Owning theme.
    pub theme_id: ThemeId,
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Completions expected per period.
    pub target_count: u32,
    /// Completions recorded so far. Never negative.
    pub done_count: u32,
    /// When the habit was last marked done (Unix seconds).
    pub last_done_at: Option<i64>,
    /// Period the target applies to.
    pub frequency: Frequency,
    /// Group this habit belongs to, if any.
    pub habit_group_id: Option<HabitGroupId>,
    /// Creation time (Unix seconds).
    pub created_at: i64,
}

// =============================================================================
// Habit groups
// =============================================================================

/// Kind of habit group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    /// Exercises that merge into a session when scheduled back to back.
    StrengthTraining,
    /// Plain user grouping without scheduling behavior.
    Custom,
}

impl GroupType {
    /// The link behavior every group of this type carries.
    pub fn link_behavior(self) -> LinkBehavior {
        match self {
            GroupType::StrengthTraining => LinkBehavior::AdjacentMerge,
            GroupType::Custom => LinkBehavior::None,
        }
    }

    /// Returns the snake_case name used in CLI arguments.
    pub fn as_str(self) -> &'static str {
        match self {
            GroupType::StrengthTraining => "strength_training",
            GroupType::Custom => "custom",
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupType {
    type Err = crate::PlannerError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "strength_training" | "strength" => Ok(GroupType::StrengthTraining),
            "custom" => Ok(GroupType::Custom),
            other => Err(crate::PlannerError::invalid(
                "group type",
                format!("unknown group type '{}'", other),
            )),
        }
    }
}

/// What happens when blocks of a group's habits touch on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkBehavior {
    /// Touching blocks are merged into one session.
    AdjacentMerge,
    /// No linking.
    None,
}

/// A named cluster of habits sharing a link behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitGroup {
    /// Group identifier.
    pub id: HabitGroupId,
    /// Owning theme.
    pub theme_id: ThemeId,
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Kind of group.
    pub group_type: GroupType,
    /// Derived from `group_type` at creation.
    pub link_behavior: LinkBehavior,
    /// Creation time (Unix seconds).
    pub created_at: i64,
}

impl HabitGroup {
    /// Builds a group whose link behavior follows its type.
    pub fn new(
        theme_id: ThemeId,
        user_id: UserId,
        name: String,
        group_type: GroupType,
        created_at: i64,
    ) -> Self {
        Self {
            id: HabitGroupId::new(),
            theme_id,
            user_id,
            name,
            group_type,
            link_behavior: group_type.link_behavior(),
            created_at,
        }
    }

    /// Whether blocks of this group's habits merge on adjacency.
    pub fn merges_adjacent(&self) -> bool {
        self.link_behavior == LinkBehavior::AdjacentMerge
    }
}

// =============================================================================
// Blocks
// =============================================================================

/// A cell on the 7-day grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    /// Day of the week, 0 = Monday.
    pub day_index: u8,
    /// Time slot within the day.
    pub time_index: u16,
}

impl GridPos {
    /// Creates a grid position.
    pub fn new(day_index: u8, time_index: u16) -> Self {
        Self {
            day_index,
            time_index,
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.day_index, self.time_index)
    }
}

/// Where a block sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockLocation {
    /// Waiting in the unscheduled tray.
    Unscheduled,
    /// Placed on the grid.
    Slot(GridPos),
}

impl BlockLocation {
    /// Grid position if scheduled.
    pub fn slot(&self) -> Option<GridPos> {
        match self {
            BlockLocation::Unscheduled => None,
            BlockLocation::Slot(pos) => Some(*pos),
        }
    }
}

/// A schedulable unit: a plain task or one occurrence of a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block identifier.
    pub id: BlockId,
    /// Owning user.
    pub user_id: UserId,
    /// Text shown on the block.
    pub label: String,
    /// Whether this block is an occurrence of a habit.
    pub is_habit_block: bool,
    /// Habit this block is an occurrence of.
    pub habit_id: Option<HabitId>,
    /// Grid placement.
    pub location: BlockLocation,
    /// Checked off on the grid.
    pub completed: bool,
    /// Free-form tag (without `#`).
    pub hashtag: Option<String>,
    /// Week the block is scheduled in; `None` while unscheduled.
    pub week_start_date: Option<WeekStart>,
    /// Session this block is merged into.
    pub session_group_id: Option<SessionGroupId>,
    /// Marks blocks used as a template for every day.
    pub is_daily_template: bool,
    /// Creation time (Unix seconds).
    pub created_at: i64,
}

impl Block {
    /// Creates an unscheduled plain block.
    pub fn new(user_id: UserId, label: String, created_at: i64) -> Self {
        Self {
            id: BlockId::new(),
            user_id,
            label,
            is_habit_block: false,
            habit_id: None,
            location: BlockLocation::Unscheduled,
            completed: false,
            hashtag: None,
            week_start_date: None,
            session_group_id: None,
            is_daily_template: false,
            created_at,
        }
    }

    /// Grid position if scheduled.
    pub fn slot(&self) -> Option<GridPos> {
        self.location.slot()
    }
}

/// Partial update for a [`Block`]. `None` leaves a field untouched;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockPatch {
    /// New label.
    pub label: Option<String>,
    /// New habit-block flag.
    pub is_habit_block: Option<bool>,
    /// New habit reference.
    pub habit_id: Option<Option<HabitId>>,
    /// New location.
    pub location: Option<BlockLocation>,
    /// New week.
    pub week_start_date: Option<Option<WeekStart>>,
    /// New completion state.
    pub completed: Option<bool>,
    /// New hashtag.
    pub hashtag: Option<Option<String>>,
    /// New session reference.
    pub session_group_id: Option<Option<SessionGroupId>>,
}

impl BlockPatch {
    /// Patch that only changes the session reference.
    pub fn session(session_group_id: Option<SessionGroupId>) -> Self {
        Self {
            session_group_id: Some(session_group_id),
            ..Default::default()
        }
    }

    /// Patch that only changes the location (and the week with it).
    pub fn location(location: BlockLocation, week: Option<WeekStart>) -> Self {
        Self {
            location: Some(location),
            week_start_date: Some(week),
            ..Default::default()
        }
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch in place.
    pub fn apply(&self, block: &mut Block) {
        if let Some(label) = &self.label {
            block.label = label.clone();
        }
        if let Some(flag) = self.is_habit_block {
            block.is_habit_block = flag;
        }
        if let Some(habit_id) = self.habit_id {
            block.habit_id = habit_id;
        }
        if let Some(location) = self.location {
            block.location = location;
        }
        if let Some(week) = self.week_start_date {
            block.week_start_date = week;
        }
        if let Some(completed) = self.completed {
            block.completed = completed;
        }
        if let Some(hashtag) = &self.hashtag {
            block.hashtag = hashtag.clone();
        }
        if let Some(session) = self.session_group_id {
            block.session_group_id = session;
        }
    }
}

/// Partial update for a [`Habit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    /// New name.
    pub name: Option<String>,
    /// New target.
    pub target_count: Option<u32>,
    /// New done count.
    pub done_count: Option<u32>,
    /// New last-done time.
    pub last_done_at: Option<Option<i64>>,
    /// New frequency.
    pub frequency: Option<Frequency>,
    /// New group reference.
    pub habit_group_id: Option<Option<HabitGroupId>>,
}

impl HabitPatch {
    /// Applies the patch in place.
    pub fn apply(&self, habit: &mut Habit) {
        if let Some(name) = &self.name {
            habit.name = name.clone();
        }
        if let Some(target) = self.target_count {
            habit.target_count = target;
        }
        if let Some(done) = self.done_count {
            habit.done_count = done;
        }
        if let Some(last) = self.last_done_at {
            habit.last_done_at = last;
        }
        if let Some(frequency) = self.frequency {
            habit.frequency = frequency;
        }
        if let Some(group) = self.habit_group_id {
            habit.habit_group_id = group;
        }
    }
}

// =============================================================================
// Session groups
// =============================================================================

/// A persisted cluster of adjacent linkable blocks for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGroup {
    /// Session identifier.
    pub id: SessionGroupId,
    /// Owning user.
    pub user_id: UserId,
    /// Week this session belongs to.
    pub week_start_date: WeekStart,
    /// Sequence number, unique per user and week, starting at 1.
    pub session_number: u32,
    /// Name chosen by the user.
    pub custom_name: Option<String>,
    /// Accent color shown on member blocks.
    pub accent_color: AccentColor,
    /// Creation time (Unix seconds).
    pub created_at: i64,
}

impl SessionGroup {
    /// The custom name, or `Session {n}`.
    pub fn display_name(&self) -> String {
        match &self.custom_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Session {}", self.session_number),
        }
    }
}

/// Partial update for a [`SessionGroup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionGroupPatch {
    /// New custom name.
    pub custom_name: Option<Option<String>>,
    /// New accent color.
    pub accent_color: Option<AccentColor>,
}

impl SessionGroupPatch {
    /// Applies the patch in place.
    pub fn apply(&self, session: &mut SessionGroup) {
        if let Some(name) = &self.custom_name {
            session.custom_name = name.clone();
        }
        if let Some(color) = self.accent_color {
            session.accent_color = color;
        }
    }
}
