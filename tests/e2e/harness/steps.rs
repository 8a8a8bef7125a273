use std::time::Duration;

use super::assertions::Assertion;
use planner_core::{GridPos, Granularity, GroupType};

/// All possible actions in a test scenario.
///
/// Records are referred to by the names given when they were created; blocks
/// get a scenario-local alias.
#[derive(Debug)]
pub enum ScenarioStep {
    // Catalogue
    CreateTheme {
        name: String,
    },
    CreateHabit {
        theme: String,
        name: String,
        target: u32,
    },
    CreateGroup {
        theme: String,
        name: String,
        group_type: GroupType,
    },
    JoinGroup {
        habit: String,
        group: Option<String>,
    },
    DeleteHabit {
        habit: String,
    },
    DeleteGroup {
        group: String,
    },

    // Grid
    Place {
        block: String,
        habit: String,
        pos: GridPos,
    },
    AddBlock {
        block: String,
        label: String,
    },
    Move {
        block: String,
        pos: GridPos,
    },
    Unschedule {
        block: String,
    },
    DeleteBlock {
        block: String,
    },
    Toggle {
        block: String,
    },
    Reconcile,
    ResetWeek,
    RenameSession {
        number: u32,
        name: Option<String>,
    },
    SetGranularity {
        granularity: Granularity,
    },
    RemoveBucket {
        index: usize,
    },

    // Store damage, as left behind by an interrupted pass
    DanglingSession {
        block: String,
    },
    DetachBlock {
        block: String,
    },
    OrphanSession,

    // Time control
    Wait {
        duration: Duration,
    },
    WaitDays {
        days: u64,
    },

    // Failure simulation
    Crash,
    Restart,

    // Assertions (can be interspersed)
    Assert {
        assertion: Assertion,
    },
}
