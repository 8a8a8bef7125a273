//! Persistent record store backed by redb.
//!
//! One table per record kind, keyed by the 16 id bytes, values encoded with
//! postcard. Every value carries an insertion sequence number so listings come
//! back in insertion order. Each write is its own transaction.

use super::{
    BlockStore, HabitGroupStore, HabitStore, NewSessionGroup, SessionGroupStore, ThemeStore,
};
use crate::error::{PlannerError, Result};
use crate::ids::{BlockId, HabitGroupId, HabitId, SessionGroupId, ThemeId, UserId};
use crate::types::{
    Block, BlockPatch, Habit, HabitGroup, HabitPatch, SessionGroup, SessionGroupPatch, Theme,
};
use crate::week::WeekStart;
use redb::{Database, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk schema version written by this build.
pub const STORE_SCHEMA_VERSION: u32 = 1;

type RecordTable = TableDefinition<'static, &'static [u8; 16], &'static [u8]>;

const METADATA_TABLE: TableDefinition<&str, u64> = TableDefinition::new("metadata");
const THEMES_TABLE: RecordTable = TableDefinition::new("themes");
const HABITS_TABLE: RecordTable = TableDefinition::new("habits");
const GROUPS_TABLE: RecordTable = TableDefinition::new("habit_groups");
const BLOCKS_TABLE: RecordTable = TableDefinition::new("blocks");
const SESSIONS_TABLE: RecordTable = TableDefinition::new("session_groups");

const VERSION_KEY: &str = "schema_version";
const SEQ_KEY: &str = "next_seq";

/// A record together with its insertion sequence number.
#[derive(Serialize, Deserialize)]
struct Stored<T> {
    seq: u64,
    record: T,
}

fn storage<E: fmt::Display>(context: &'static str) -> impl FnOnce(E) -> PlannerError {
    move |e| PlannerError::Storage(format!("{}: {}", context, e))
}

fn encode<T: Serialize>(stored: &Stored<T>) -> Result<Vec<u8>> {
    postcard::to_allocvec(stored).map_err(|e| PlannerError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<Stored<T>> {
    postcard::from_bytes(bytes).map_err(|e| PlannerError::Deserialization(e.to_string()))
}

/// Record store kept in a single redb file.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedbStore").field("path", &self.path).finish()
    }
}

impl RedbStore {
    /// Opens the store at `path`, creating the file and tables if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::SchemaMismatch`] if the file was written with a
    /// different schema version.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(&path).map_err(storage("failed to open store"))?;

        let write_txn = db.begin_write().map_err(storage("failed to begin write"))?;
        {
            let mut meta = write_txn
                .open_table(METADATA_TABLE)
                .map_err(storage("failed to open metadata table"))?;
            let found = meta
                .get(VERSION_KEY)
                .map_err(storage("failed to read schema version"))?
                .map(|v| v.value());
            match found {
                Some(version) if version != u64::from(STORE_SCHEMA_VERSION) => {
                    return Err(PlannerError::SchemaMismatch {
                        found: u32::try_from(version).unwrap_or(u32::MAX),
                        expected: STORE_SCHEMA_VERSION,
                    });
                }
                Some(_) => {}
                None => {
                    meta.insert(VERSION_KEY, u64::from(STORE_SCHEMA_VERSION))
                        .map_err(storage("failed to write schema version"))?;
                }
            }

            for table in [
                THEMES_TABLE,
                HABITS_TABLE,
                GROUPS_TABLE,
                BLOCKS_TABLE,
                SESSIONS_TABLE,
            ] {
                write_txn
                    .open_table(table)
                    .map_err(storage("failed to create table"))?;
            }
        }
        write_txn.commit().map_err(storage("failed to commit"))?;

        debug!(path = %path.display(), "opened record store");
        Ok(Self { db, path })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn list<T, F>(&self, table: RecordTable, keep: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let read_txn = self.db.begin_read().map_err(storage("failed to begin read"))?;
        let table = read_txn
            .open_table(table)
            .map_err(storage("failed to open table"))?;

        let mut rows: Vec<Stored<T>> = Vec::new();
        for entry in table.iter().map_err(storage("failed to iterate table"))? {
            let (_, value) = entry.map_err(storage("failed to read row"))?;
            let stored: Stored<T> = decode(value.value())?;
            if keep(&stored.record) {
                rows.push(stored);
            }
        }
        rows.sort_by_key(|row| row.seq);
        Ok(rows.into_iter().map(|row| row.record).collect())
    }

    fn get<T: DeserializeOwned>(&self, table: RecordTable, key: &[u8; 16]) -> Result<Option<T>> {
        let read_txn = self.db.begin_read().map_err(storage("failed to begin read"))?;
        let table = read_txn
            .open_table(table)
            .map_err(storage("failed to open table"))?;
        let value = table.get(key).map_err(storage("failed to read row"))?;
        match value {
            Some(guard) => Ok(Some(decode::<T>(guard.value())?.record)),
            None => Ok(None),
        }
    }

    fn insert<T: Serialize>(&mut self, table: RecordTable, key: &[u8; 16], record: T) -> Result<()> {
        let write_txn = self.db.begin_write().map_err(storage("failed to begin write"))?;
        {
            let mut meta = write_txn
                .open_table(METADATA_TABLE)
                .map_err(storage("failed to open metadata table"))?;
            let seq = meta
                .get(SEQ_KEY)
                .map_err(storage("failed to read sequence"))?
                .map(|v| v.value())
                .unwrap_or(0);
            meta.insert(SEQ_KEY, seq + 1)
                .map_err(storage("failed to advance sequence"))?;

            let bytes = encode(&Stored { seq, record })?;
            let mut records = write_txn
                .open_table(table)
                .map_err(storage("failed to open table"))?;
            records
                .insert(key, bytes.as_slice())
                .map_err(storage("failed to insert row"))?;
        }
        write_txn.commit().map_err(storage("failed to commit"))?;
        Ok(())
    }

    fn update<T, F>(
        &mut self,
        table: RecordTable,
        entity: &'static str,
        key: &[u8; 16],
        id: impl fmt::Display,
        change: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce(&mut T),
    {
        let write_txn = self.db.begin_write().map_err(storage("failed to begin write"))?;
        let updated = {
            let mut records = write_txn
                .open_table(table)
                .map_err(storage("failed to open table"))?;
            let existing = {
                let guard = records.get(key).map_err(storage("failed to read row"))?;
                match guard {
                    Some(value) => decode::<T>(value.value())?,
                    None => return Err(PlannerError::not_found(entity, id)),
                }
            };

            let mut stored = existing;
            change(&mut stored.record);
            let bytes = encode(&stored)?;
            records
                .insert(key, bytes.as_slice())
                .map_err(storage("failed to update row"))?;
            stored.record
        };
        write_txn.commit().map_err(storage("failed to commit"))?;
        Ok(updated)
    }

    fn remove(
        &mut self,
        table: RecordTable,
        entity: &'static str,
        key: &[u8; 16],
        id: impl fmt::Display,
    ) -> Result<()> {
        let write_txn = self.db.begin_write().map_err(storage("failed to begin write"))?;
        let removed = {
            let mut records = write_txn
                .open_table(table)
                .map_err(storage("failed to open table"))?;
            let existed = records
                .remove(key)
                .map_err(storage("failed to delete row"))?
                .is_some();
            existed
        };
        if !removed {
            write_txn.abort().map_err(storage("failed to abort"))?;
            return Err(PlannerError::not_found(entity, id));
        }
        write_txn.commit().map_err(storage("failed to commit"))?;
        Ok(())
    }
}

impl BlockStore for RedbStore {
    fn blocks_for_week(&self, user: &UserId, week: WeekStart) -> Result<Vec<Block>> {
        self.list(BLOCKS_TABLE, |b: &Block| {
            &b.user_id == user && b.week_start_date.map_or(true, |w| w == week)
        })
    }

    fn blocks_for_user(&self, user: &UserId) -> Result<Vec<Block>> {
        self.list(BLOCKS_TABLE, |b: &Block| &b.user_id == user)
    }

    fn get_block(&self, id: BlockId) -> Result<Option<Block>> {
        self.get(BLOCKS_TABLE, id.as_bytes())
    }

    fn insert_block(&mut self, block: Block) -> Result<()> {
        let key = *block.id.as_bytes();
        self.insert(BLOCKS_TABLE, &key, block)
    }

    fn update_block(&mut self, id: BlockId, patch: &BlockPatch) -> Result<Block> {
        self.update(BLOCKS_TABLE, "block", id.as_bytes(), id, |b: &mut Block| {
            patch.apply(b)
        })
    }

    fn delete_block(&mut self, id: BlockId) -> Result<()> {
        self.remove(BLOCKS_TABLE, "block", id.as_bytes(), id)
    }
}

impl HabitStore for RedbStore {
    fn habits_for_user(&self, user: &UserId) -> Result<Vec<Habit>> {
        self.list(HABITS_TABLE, |h: &Habit| &h.user_id == user)
    }

    fn get_habit(&self, id: HabitId) -> Result<Option<Habit>> {
        self.get(HABITS_TABLE, id.as_bytes())
    }

    fn insert_habit(&mut self, habit: Habit) -> Result<()> {
        let key = *habit.id.as_bytes();
        self.insert(HABITS_TABLE, &key, habit)
    }

    fn update_habit(&mut self, id: HabitId, patch: &HabitPatch) -> Result<Habit> {
        self.update(HABITS_TABLE, "habit", id.as_bytes(), id, |h: &mut Habit| {
            patch.apply(h)
        })
    }

    fn delete_habit(&mut self, id: HabitId) -> Result<()> {
        self.remove(HABITS_TABLE, "habit", id.as_bytes(), id)
    }
}

impl HabitGroupStore for RedbStore {
    fn habit_groups_for_user(&self, user: &UserId) -> Result<Vec<HabitGroup>> {
        self.list(GROUPS_TABLE, |g: &HabitGroup| &g.user_id == user)
    }

    fn get_habit_group(&self, id: HabitGroupId) -> Result<Option<HabitGroup>> {
        self.get(GROUPS_TABLE, id.as_bytes())
    }

    fn insert_habit_group(&mut self, group: HabitGroup) -> Result<()> {
        let key = *group.id.as_bytes();
        self.insert(GROUPS_TABLE, &key, group)
    }

    fn rename_habit_group(&mut self, id: HabitGroupId, name: &str) -> Result<HabitGroup> {
        self.update(
            GROUPS_TABLE,
            "habit group",
            id.as_bytes(),
            id,
            |g: &mut HabitGroup| g.name = name.to_string(),
        )
    }

    fn delete_habit_group(&mut self, id: HabitGroupId) -> Result<()> {
        self.remove(GROUPS_TABLE, "habit group", id.as_bytes(), id)
    }
}

impl ThemeStore for RedbStore {
    fn themes_for_user(&self, user: &UserId) -> Result<Vec<Theme>> {
        self.list(THEMES_TABLE, |t: &Theme| &t.user_id == user)
    }

    fn get_theme(&self, id: ThemeId) -> Result<Option<Theme>> {
        self.get(THEMES_TABLE, id.as_bytes())
    }

    fn insert_theme(&mut self, theme: Theme) -> Result<()> {
        let key = *theme.id.as_bytes();
        self.insert(THEMES_TABLE, &key, theme)
    }

    fn rename_theme(&mut self, id: ThemeId, name: &str) -> Result<Theme> {
        self.update(THEMES_TABLE, "theme", id.as_bytes(), id, |t: &mut Theme| {
            t.name = name.to_string()
        })
    }

    fn delete_theme(&mut self, id: ThemeId) -> Result<()> {
        self.remove(THEMES_TABLE, "theme", id.as_bytes(), id)
    }
}

impl SessionGroupStore for RedbStore {
    fn sessions_for_week(&self, user: &UserId, week: WeekStart) -> Result<Vec<SessionGroup>> {
        self.list(SESSIONS_TABLE, |s: &SessionGroup| {
            &s.user_id == user && s.week_start_date == week
        })
    }

    fn get_session(&self, id: SessionGroupId) -> Result<Option<SessionGroup>> {
        self.get(SESSIONS_TABLE, id.as_bytes())
    }

    fn create_session(&mut self, session: NewSessionGroup) -> Result<SessionGroup> {
        let created = SessionGroup {
            id: SessionGroupId::new(),
            user_id: session.user_id,
            week_start_date: session.week_start_date,
            session_number: session.session_number,
            custom_name: session.custom_name,
            accent_color: session.accent_color,
            created_at: session.created_at,
        };
        let key = *created.id.as_bytes();
        self.insert(SESSIONS_TABLE, &key, created.clone())?;
        Ok(created)
    }

    fn update_session(
        &mut self,
        id: SessionGroupId,
        patch: &SessionGroupPatch,
    ) -> Result<SessionGroup> {
        self.update(
            SESSIONS_TABLE,
            "session",
            id.as_bytes(),
            id,
            |s: &mut SessionGroup| patch.apply(s),
        )
    }

    fn delete_session(&mut self, id: SessionGroupId) -> Result<()> {
        self.remove(SESSIONS_TABLE, "session", id.as_bytes(), id)
    }
}
