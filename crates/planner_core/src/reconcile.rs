//! Session reconciliation.
//!
//! A pass recomputes the adjacency clusters of the current week from scratch
//! and brings the stored sessions in line with them using the fewest writes:
//!
//! 1. Blocks that carry a session but belong to no cluster are cleared.
//! 2. Each cluster, in discovery order, reuses the first stored session whose
//!    members overlap it, or gets a new session. Both halves of a split
//!    session overlap it, so both keep it.
//! 3. Stored sessions that no cluster claimed and no block references are deleted.
//!
//! Writes are issued one at a time. The first failing write aborts the pass and
//! leaves earlier writes in place; running the pass again converges.

use crate::error::Result;
use crate::graph::{find_adjacent_groups, AdjacencyMode, AdjacentGroup};
use crate::ids::{BlockId, SessionGroupId, UserId};
use crate::palette::{next_accent_color, AccentColor};
use crate::store::{NewSessionGroup, PlannerStore};
use crate::types::{Block, BlockPatch, SessionGroup};
use crate::week::WeekStart;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Week the pass ran against.
    pub week_start_date: WeekStart,
    /// Clusters of two or more linkable blocks.
    pub groups_found: usize,
    /// Sessions created.
    pub sessions_created: usize,
    /// Existing sessions matched to a cluster.
    pub sessions_reused: usize,
    /// Sessions deleted because nothing referenced them any more.
    pub sessions_deleted: usize,
    /// Blocks whose session reference was set or changed.
    pub blocks_assigned: usize,
    /// Blocks whose session reference was cleared.
    pub blocks_cleared: usize,
    /// Total store writes issued.
    pub writes: usize,
}

impl ReconcileReport {
    fn new(week_start_date: WeekStart) -> Self {
        Self {
            week_start_date,
            groups_found: 0,
            sessions_created: 0,
            sessions_reused: 0,
            sessions_deleted: 0,
            blocks_assigned: 0,
            blocks_cleared: 0,
            writes: 0,
        }
    }

    /// True if the pass found the store already consistent.
    pub fn is_noop(&self) -> bool {
        self.writes == 0
    }
}

/// Runs one reconciliation pass for `user` in the week containing `now`.
///
/// # Errors
///
/// Propagates the first store error. Writes issued before the failure stay
/// applied.
pub fn reconcile<S>(
    store: &mut S,
    user: &UserId,
    now: i64,
    mode: AdjacencyMode,
) -> Result<ReconcileReport>
where
    S: PlannerStore + ?Sized,
{
    let week = WeekStart::from_unix(now)?;
    let blocks = store.blocks_for_week(user, week)?;
    let habits = store.habits_for_user(user)?;
    let groups = store.habit_groups_for_user(user)?;

    let candidates = find_adjacent_groups(&blocks, &habits, &groups, mode);
    debug!(
        %week,
        blocks = blocks.len(),
        groups = candidates.len(),
        "computed adjacency clusters"
    );

    let sessions = store.sessions_for_week(user, week)?;

    let mut pass = Pass {
        store,
        user,
        week,
        now,
        report: ReconcileReport::new(week),
        assignment: blocks
            .iter()
            .map(|b| (b.id, b.session_group_id))
            .collect(),
        colors_in_use: sessions.iter().map(|s| s.accent_color).collect(),
    };
    pass.report.groups_found = candidates.len();

    pass.clear_orphans(&blocks, &candidates)?;
    let claimed = pass.assign_groups(&blocks, &sessions, &candidates)?;
    pass.delete_unused(&sessions, &claimed)?;

    debug!(
        created = pass.report.sessions_created,
        reused = pass.report.sessions_reused,
        deleted = pass.report.sessions_deleted,
        writes = pass.report.writes,
        "reconciliation finished"
    );
    Ok(pass.report)
}

/// Working state of one pass.
struct Pass<'a, S: ?Sized> {
    store: &'a mut S,
    user: &'a UserId,
    week: WeekStart,
    now: i64,
    report: ReconcileReport,
    /// Session reference of every block as of the writes issued so far.
    assignment: IndexMap<BlockId, Option<SessionGroupId>>,
    colors_in_use: Vec<AccentColor>,
}

impl<S> Pass<'_, S>
where
    S: PlannerStore + ?Sized,
{
    fn set_session(&mut self, block: BlockId, session: Option<SessionGroupId>) -> Result<()> {
        self.store
            .update_block(block, &BlockPatch::session(session))?;
        self.report.writes += 1;
        self.assignment.insert(block, session);
        Ok(())
    }

    fn clear_orphans(&mut self, blocks: &[Block], candidates: &[AdjacentGroup]) -> Result<()> {
        let grouped: HashSet<BlockId> = candidates
            .iter()
            .flat_map(|g| g.blocks.iter().map(|b| b.id))
            .collect();

        for block in blocks {
            if block.session_group_id.is_some() && !grouped.contains(&block.id) {
                debug!(block = %block.id, "clearing session from ungrouped block");
                self.set_session(block.id, None)?;
                self.report.blocks_cleared += 1;
            }
        }
        Ok(())
    }

    fn assign_groups(
        &mut self,
        blocks: &[Block],
        sessions: &[SessionGroup],
        candidates: &[AdjacentGroup],
    ) -> Result<HashSet<SessionGroupId>> {
        let mut members: HashMap<SessionGroupId, BTreeSet<BlockId>> = HashMap::new();
        for block in blocks {
            if let Some(session) = block.session_group_id {
                members.entry(session).or_default().insert(block.id);
            }
        }

        let mut claimed = HashSet::new();
        for candidate in candidates {
            let ids = candidate.block_ids();
            let matched = sessions.iter().find(|s| {
                members
                    .get(&s.id)
                    .is_some_and(|m| !m.is_disjoint(&ids))
            });

            let session_id = match matched {
                Some(session) => {
                    debug!(session = %session.id, members = ids.len(), "reusing session");
                    self.report.sessions_reused += 1;
                    session.id
                }
                None => self.create_session()?,
            };
            claimed.insert(session_id);

            for block in &candidate.blocks {
                let current = self.assignment.get(&block.id).copied().flatten();
                if current != Some(session_id) {
                    self.set_session(block.id, Some(session_id))?;
                    self.report.blocks_assigned += 1;
                }
            }
        }
        Ok(claimed)
    }

    fn create_session(&mut self) -> Result<SessionGroupId> {
        let number = self.store.next_session_number(self.user, self.week)?;
        let color = next_accent_color(&self.colors_in_use);
        let session = self.store.create_session(NewSessionGroup {
            user_id: self.user.clone(),
            week_start_date: self.week,
            session_number: number,
            accent_color: color,
            custom_name: None,
            created_at: self.now,
        })?;
        self.report.writes += 1;
        self.report.sessions_created += 1;
        self.colors_in_use.push(color);
        info!(
            session = %session.id,
            number,
            color = %color,
            week = %self.week,
            "created session"
        );
        Ok(session.id)
    }

    fn delete_unused(
        &mut self,
        sessions: &[SessionGroup],
        claimed: &HashSet<SessionGroupId>,
    ) -> Result<()> {
        for session in sessions {
            if claimed.contains(&session.id) {
                continue;
            }
            let referenced = self
                .assignment
                .values()
                .any(|assigned| *assigned == Some(session.id));
            if referenced {
                continue;
            }
            self.store.delete_session(session.id)?;
            self.report.writes += 1;
            self.report.sessions_deleted += 1;
            info!(session = %session.id, number = session.session_number, "deleted empty session");
        }
        Ok(())
    }
}
