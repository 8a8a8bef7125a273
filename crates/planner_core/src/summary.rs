//! Weekly progress summary.

use crate::ids::HabitId;
use crate::types::{Block, Frequency, Habit};
use crate::week::WeekStart;
use serde::Serialize;

/// Progress over the blocks scheduled in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekSummary {
    /// Week summarized.
    pub week_start_date: WeekStart,
    /// Blocks placed on the grid.
    pub scheduled: usize,
    /// Scheduled blocks checked off.
    pub completed: usize,
    /// `completed / scheduled` as a rounded percentage; 0 for an empty week.
    pub percent: u32,
    /// One entry per habit with a frequency, in creation order.
    pub habits: Vec<HabitProgress>,
}

/// Completed grid blocks of one habit against its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitProgress {
    pub habit_id: HabitId,
    pub name: String,
    pub completed: usize,
    pub target: u32,
    /// Rounded percentage of the target, capped at 100.
    pub percent: u32,
    pub reached: bool,
}

/// Summarizes `blocks` (tray blocks are ignored) for `week`.
pub fn summarize(week: WeekStart, blocks: &[Block], habits: &[Habit]) -> WeekSummary {
    let scheduled: Vec<&Block> = blocks.iter().filter(|b| b.slot().is_some()).collect();
    let completed = scheduled.iter().filter(|b| b.completed).count();

    let habits = habits
        .iter()
        .filter(|h| h.frequency != Frequency::None)
        .map(|habit| {
            let done = scheduled
                .iter()
                .filter(|b| b.completed && b.habit_id == Some(habit.id))
                .count();
            let target = usize::try_from(habit.target_count).unwrap_or(usize::MAX);
            HabitProgress {
                habit_id: habit.id,
                name: habit.name.clone(),
                completed: done,
                target: habit.target_count,
                percent: rounded_percent(done, target).min(100),
                reached: done >= target,
            }
        })
        .collect();

    WeekSummary {
        week_start_date: week,
        scheduled: scheduled.len(),
        completed,
        percent: rounded_percent(completed, scheduled.len()),
        habits,
    }
}

/// `part / whole * 100`, rounded half up. 0 when `whole` is 0.
fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u64;
    let whole = whole as u64;
    u32::try_from((part * 200 + whole) / (whole * 2)).unwrap_or(u32::MAX)
}
