use anyhow::Result;
use planner_core::{AccentColor, GridPos, Planner};

/// Declarative assertions on planner state
pub enum Assertion {
    // Sessions of the current week
    SessionCount(usize),
    SessionNumbers(Vec<u32>),
    SessionColors(Vec<AccentColor>),
    SessionName {
        number: u32,
        name: String,
    },

    // Membership
    SameSession(Vec<String>),
    DifferentSessions(String, String),
    Unlinked(String),

    // Blocks
    InTray(String),
    BlockAt {
        block: String,
        pos: GridPos,
    },
    BlockCompleted {
        block: String,
        completed: bool,
    },
    PlainBlock(String),

    // Habits
    HabitDone {
        habit: String,
        count: u32,
    },

    // Last reconciliation pass
    LastPassWrites(usize),
    LastPassNoop,
    LastPassDeleted(usize),
    LastPassCreated(usize),

    // Whole-store checks
    Stable,
    Consistent,
    LockHeld,
    NoPanic,

    // Custom (takes mutable reference to allow mutations)
    Custom(Box<dyn Fn(&mut Planner) -> Result<()> + Send + Sync>),
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionCount(n) => write!(f, "SessionCount({})", n),
            Self::SessionNumbers(n) => write!(f, "SessionNumbers({:?})", n),
            Self::SessionColors(c) => write!(f, "SessionColors({:?})", c),
            Self::SessionName { number, name } => {
                write!(f, "SessionName {{ number: {}, name: {:?} }}", number, name)
            }
            Self::SameSession(blocks) => write!(f, "SameSession({:?})", blocks),
            Self::DifferentSessions(a, b) => write!(f, "DifferentSessions({:?}, {:?})", a, b),
            Self::Unlinked(b) => write!(f, "Unlinked({:?})", b),
            Self::InTray(b) => write!(f, "InTray({:?})", b),
            Self::BlockAt { block, pos } => {
                write!(f, "BlockAt {{ block: {:?}, pos: {} }}", block, pos)
            }
            Self::BlockCompleted { block, completed } => write!(
                f,
                "BlockCompleted {{ block: {:?}, completed: {} }}",
                block, completed
            ),
            Self::PlainBlock(b) => write!(f, "PlainBlock({:?})", b),
            Self::HabitDone { habit, count } => {
                write!(f, "HabitDone {{ habit: {:?}, count: {} }}", habit, count)
            }
            Self::LastPassWrites(n) => write!(f, "LastPassWrites({})", n),
            Self::LastPassNoop => write!(f, "LastPassNoop"),
            Self::LastPassDeleted(n) => write!(f, "LastPassDeleted({})", n),
            Self::LastPassCreated(n) => write!(f, "LastPassCreated({})", n),
            Self::Stable => write!(f, "Stable"),
            Self::Consistent => write!(f, "Consistent"),
            Self::LockHeld => write!(f, "LockHeld"),
            Self::NoPanic => write!(f, "NoPanic"),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}
