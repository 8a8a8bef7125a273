//! Error types for planner_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for planner_core operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Record with the given ID was not found in the store.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record (block, habit, ...)
        entity: &'static str,
        /// The identifier that was looked up
        id: String,
    },

    /// A user-supplied value failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A grid position lies outside the configured grid.
    #[error("slot (day {day_index}, time {time_index}) is outside the grid (7 days x {slot_count} slots)")]
    SlotOutOfRange {
        /// Requested day index
        day_index: u8,
        /// Requested time index
        time_index: u16,
        /// Number of time slots currently configured
        slot_count: u16,
    },

    /// Operation requires a habit block.
    #[error("block {0} is not a habit block")]
    NotAHabitBlock(String),

    /// The record store failed to read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// The record store is unreachable (network or injected fault).
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Serialization error while encoding a record.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error while decoding a record.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Stored schema does not match this build.
    #[error("store schema version mismatch: found {found}, expected {expected}")]
    SchemaMismatch {
        /// Version found on disk
        found: u32,
        /// Version this build writes
        expected: u32,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// No planner directory at the given location.
    #[error("not a planner directory: {}", .0.display())]
    NotInitialized(PathBuf),

    /// A planner directory already exists at the given location.
    #[error("planner already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// The planner directory is locked by another process.
    #[error("planner locked by another process (PID: {pid})")]
    LockHeld {
        /// Process ID holding the lock
        pid: u32,
    },

    /// The planner directory is locked and the holder could not be determined.
    #[error("planner directory locked")]
    Locked,
}

impl PlannerError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true if this error came from the record store rather than from
    /// validation. Reconciliation passes aborted by such errors can simply be
    /// re-run once the store is reachable again.
    pub fn is_store_fault(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::StoreUnavailable(_)
                | Self::Serialization(_)
                | Self::Deserialization(_)
                | Self::Io(_)
        )
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized(_) => Some("Run 'planner init' to create a planner here."),
            Self::AlreadyInitialized(_) => {
                Some("Use the existing planner, or pass --dir to pick another location.")
            }
            Self::LockHeld { .. } => {
                Some("Another planner process is running. Wait for it to exit and retry.")
            }
            Self::Locked => Some("Remove .planner/LOCK if no planner process is running."),
            Self::SlotOutOfRange { .. } => {
                Some("Check the grid with 'planner grid show' for valid time slots.")
            }
            Self::StoreUnavailable(_) | Self::Storage(_) => {
                Some("Sessions may be partially updated. Run 'planner reconcile' once the store is reachable.")
            }
            Self::SchemaMismatch { .. } => {
                Some("This planner was written by a different version of the tool.")
            }
            _ => None,
        }
    }
}

/// Convenience Result type for planner_core operations.
pub type Result<T> = std::result::Result<T, PlannerError>;
