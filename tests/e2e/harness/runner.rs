use super::assertions::Assertion;
use super::clock::MockClock;
use super::steps::ScenarioStep;
use super::workspace::TestWorkspace;
use anyhow::{anyhow, bail, ensure, Context, Result};
use planner_core::store::{BlockStore, NewSessionGroup, SessionGroupStore};
use planner_core::{
    AccentColor, BlockId, BlockLocation, BlockPatch, Frequency, GridPos, HabitGroupId, HabitId,
    Planner, PlannerError, ReconcileReport, SessionGroup, SessionGroupId, ThemeId,
};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Executes scenarios against a real on-disk planner
pub struct ScenarioRunner {
    workspace: TestWorkspace,
    planner: Option<Planner>,
    clock: MockClock,
    crashed: bool,
    current_step: usize,
    last_report: Option<ReconcileReport>,
    themes: HashMap<String, ThemeId>,
    habits: HashMap<String, HabitId>,
    groups: HashMap<String, HabitGroupId>,
    blocks: HashMap<String, BlockId>,
}

impl ScenarioRunner {
    /// Create a new runner, from a fixture or a fresh planner
    pub fn new(fixture: Option<&str>) -> Result<Self> {
        let workspace = match fixture {
            Some(name) => TestWorkspace::from_fixture(name)?,
            None => TestWorkspace::empty()?,
        };
        let clock = MockClock::new();
        let planner = if workspace.has_planner() {
            workspace.open_planner()?
        } else {
            workspace.init_planner()?
        }
        .with_time_provider(clock.as_provider());

        Ok(Self {
            workspace,
            planner: Some(planner),
            clock,
            crashed: false,
            current_step: 0,
            last_report: None,
            themes: HashMap::new(),
            habits: HashMap::new(),
            groups: HashMap::new(),
            blocks: HashMap::new(),
        })
    }

    /// Get current step number
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Execute all steps in sequence
    pub fn execute(&mut self, steps: &[ScenarioStep]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.current_step = i;
            self.execute_step(step)
                .with_context(|| format!("Step {}: {:?}", i, step))?;
        }
        Ok(())
    }

    /// Execute a single step
    fn execute_step(&mut self, step: &ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::CreateTheme { name } => self.handle_create_theme(name),
            ScenarioStep::CreateHabit {
                theme,
                name,
                target,
            } => self.handle_create_habit(theme, name, *target),
            ScenarioStep::CreateGroup {
                theme,
                name,
                group_type,
            } => {
                let theme = self.theme_id(theme)?;
                let group = self
                    .planner_mut()?
                    .create_habit_group(theme, name, *group_type)?;
                self.groups.insert(name.clone(), group.id);
                Ok(())
            }
            ScenarioStep::JoinGroup { habit, group } => {
                let habit = self.habit_id(habit)?;
                let group = group.as_deref().map(|g| self.group_id(g)).transpose()?;
                let report = self.planner_mut()?.set_habit_group(habit, group)?;
                self.record(report)
            }
            ScenarioStep::DeleteHabit { habit } => {
                let id = self.habit_id(habit)?;
                let report = self.planner_mut()?.delete_habit(id)?;
                self.habits.remove(habit);
                self.record(report)
            }
            ScenarioStep::DeleteGroup { group } => {
                let id = self.group_id(group)?;
                let report = self.planner_mut()?.delete_habit_group(id)?;
                self.groups.remove(group);
                self.record(report)
            }

            ScenarioStep::Place { block, habit, pos } => self.handle_place(block, habit, *pos),
            ScenarioStep::AddBlock { block, label } => {
                let created = self.planner_mut()?.create_block(label, None)?;
                self.blocks.insert(block.clone(), created.id);
                Ok(())
            }
            ScenarioStep::Move { block, pos } => {
                let id = self.block_id(block)?;
                let report = self.planner_mut()?.move_block(id, *pos)?;
                self.record(report)
            }
            ScenarioStep::Unschedule { block } => {
                let id = self.block_id(block)?;
                let report = self.planner_mut()?.unschedule_block(id)?;
                self.record(report)
            }
            ScenarioStep::DeleteBlock { block } => {
                let id = self.block_id(block)?;
                let report = self.planner_mut()?.delete_block(id)?;
                self.blocks.remove(block);
                self.record(report)
            }
            ScenarioStep::Toggle { block } => {
                let id = self.block_id(block)?;
                self.planner_mut()?.toggle_block_completion(id)?;
                Ok(())
            }
            ScenarioStep::Reconcile => {
                let report = self.planner_mut()?.reconcile()?;
                self.record(report)
            }
            ScenarioStep::ResetWeek => {
                self.planner_mut()?.reset_week()?;
                Ok(())
            }
            ScenarioStep::RenameSession { number, name } => {
                let session = self.session_by_number(*number)?;
                self.planner_mut()?
                    .rename_session(session.id, name.as_deref())?;
                Ok(())
            }
            ScenarioStep::SetGranularity { granularity } => {
                let change = self.planner_mut()?.set_granularity(*granularity)?;
                self.record(change.report)
            }
            ScenarioStep::RemoveBucket { index } => {
                let change = self.planner_mut()?.remove_bucket(*index)?;
                self.record(change.report)
            }

            ScenarioStep::DanglingSession { block } => {
                let id = self.block_id(block)?;
                self.planner_mut()?
                    .store_mut()
                    .update_block(id, &BlockPatch::session(Some(SessionGroupId::new())))?;
                Ok(())
            }
            ScenarioStep::DetachBlock { block } => {
                let id = self.block_id(block)?;
                self.planner_mut()?
                    .store_mut()
                    .update_block(id, &BlockPatch::session(None))?;
                Ok(())
            }
            ScenarioStep::OrphanSession => self.handle_orphan_session(),

            ScenarioStep::Wait { duration } => self.handle_wait(*duration),
            ScenarioStep::WaitDays { days } => self.handle_wait(Duration::from_secs(days * 86400)),

            ScenarioStep::Crash => self.handle_crash(),
            ScenarioStep::Restart => self.handle_restart(),

            ScenarioStep::Assert { assertion } => self.handle_assertion(assertion),
        }
    }

    // ===== Lookups =====

    fn planner(&self) -> Result<&Planner> {
        self.planner
            .as_ref()
            .ok_or_else(|| anyhow!("Planner not available (crashed?)"))
    }

    fn planner_mut(&mut self) -> Result<&mut Planner> {
        self.planner
            .as_mut()
            .ok_or_else(|| anyhow!("Planner not available (crashed?)"))
    }

    fn theme_id(&self, name: &str) -> Result<ThemeId> {
        self.themes
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("Unknown theme '{}'", name))
    }

    fn habit_id(&self, name: &str) -> Result<HabitId> {
        self.habits
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("Unknown habit '{}'", name))
    }

    fn group_id(&self, name: &str) -> Result<HabitGroupId> {
        self.groups
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("Unknown group '{}'", name))
    }

    fn block_id(&self, alias: &str) -> Result<BlockId> {
        self.blocks
            .get(alias)
            .copied()
            .ok_or_else(|| anyhow!("Unknown block '{}'", alias))
    }

    fn session_of(&self, alias: &str) -> Result<Option<SessionGroupId>> {
        let id = self.block_id(alias)?;
        Ok(self.planner()?.block(id)?.session_group_id)
    }

    fn session_by_number(&self, number: u32) -> Result<SessionGroup> {
        self.planner()?
            .sessions()?
            .into_iter()
            .find(|s| s.session_number == number)
            .ok_or_else(|| anyhow!("No session numbered {}", number))
    }

    fn record(&mut self, report: ReconcileReport) -> Result<()> {
        self.last_report = Some(report);
        Ok(())
    }

    fn last_report(&self) -> Result<&ReconcileReport> {
        self.last_report
            .as_ref()
            .ok_or_else(|| anyhow!("No reconciliation pass has run yet"))
    }

    // ===== Action handlers =====

    fn handle_create_theme(&mut self, name: &str) -> Result<()> {
        let theme = self.planner_mut()?.create_theme(name)?;
        self.themes.insert(name.to_string(), theme.id);
        Ok(())
    }

    fn handle_create_habit(&mut self, theme: &str, name: &str, target: u32) -> Result<()> {
        let theme = self.theme_id(theme)?;
        let habit = self
            .planner_mut()?
            .create_habit(theme, name, target, Frequency::Weekly)?;
        self.habits.insert(name.to_string(), habit.id);
        Ok(())
    }

    fn handle_place(&mut self, alias: &str, habit: &str, pos: GridPos) -> Result<()> {
        let habit = self.habit_id(habit)?;
        let (block, report) = self.planner_mut()?.create_habit_block_at(habit, pos)?;
        self.blocks.insert(alias.to_string(), block.id);
        self.record(report)
    }

    fn handle_orphan_session(&mut self) -> Result<()> {
        let planner = self.planner_mut()?;
        let user = planner.user().clone();
        let week = planner.current_week()?;
        let now = planner.now();
        let store = planner.store_mut();
        let session_number = store.next_session_number(&user, week)?;
        store.create_session(NewSessionGroup {
            user_id: user,
            week_start_date: week,
            session_number,
            accent_color: AccentColor::Amber,
            custom_name: None,
            created_at: now,
        })?;
        Ok(())
    }

    fn handle_wait(&mut self, duration: Duration) -> Result<()> {
        self.clock.advance(duration);
        Ok(())
    }

    // ===== Failure simulation =====

    fn handle_crash(&mut self) -> Result<()> {
        // Drop the planner between operations; committed writes must survive
        self.planner = None;
        self.crashed = true;
        Ok(())
    }

    fn handle_restart(&mut self) -> Result<()> {
        if !self.crashed {
            return Err(anyhow!("Cannot restart - not crashed"));
        }

        let planner = self
            .workspace
            .open_planner()?
            .with_time_provider(self.clock.as_provider());

        self.planner = Some(planner);
        self.crashed = false;

        Ok(())
    }

    // ===== Assertions =====

    fn handle_assertion(&mut self, assertion: &Assertion) -> Result<()> {
        match assertion {
            Assertion::SessionCount(expected) => {
                let actual = self.planner()?.sessions()?.len();
                ensure!(
                    actual == *expected,
                    "Expected {} session(s), found {}",
                    expected,
                    actual
                );
                Ok(())
            }
            Assertion::SessionNumbers(expected) => {
                let actual: Vec<u32> = self
                    .planner()?
                    .sessions()?
                    .iter()
                    .map(|s| s.session_number)
                    .collect();
                ensure!(
                    &actual == expected,
                    "Expected session numbers {:?}, found {:?}",
                    expected,
                    actual
                );
                Ok(())
            }
            Assertion::SessionColors(expected) => {
                let actual: Vec<AccentColor> = self
                    .planner()?
                    .sessions()?
                    .iter()
                    .map(|s| s.accent_color)
                    .collect();
                ensure!(
                    &actual == expected,
                    "Expected colors {:?}, found {:?}",
                    expected,
                    actual
                );
                Ok(())
            }
            Assertion::SessionName { number, name } => {
                let actual = self.session_by_number(*number)?.display_name();
                ensure!(
                    &actual == name,
                    "Session {} is called {:?}, expected {:?}",
                    number,
                    actual,
                    name
                );
                Ok(())
            }
            Assertion::SameSession(blocks) => self.assert_same_session(blocks),
            Assertion::DifferentSessions(a, b) => {
                let (sa, sb) = (self.session_of(a)?, self.session_of(b)?);
                ensure!(
                    sa.is_some() && sb.is_some(),
                    "Both '{}' and '{}' should be linked",
                    a,
                    b
                );
                ensure!(sa != sb, "'{}' and '{}' share a session", a, b);
                Ok(())
            }
            Assertion::Unlinked(block) => {
                let session = self.session_of(block)?;
                ensure!(
                    session.is_none(),
                    "'{}' should be unlinked, has {:?}",
                    block,
                    session
                );
                Ok(())
            }
            Assertion::InTray(block) => {
                let id = self.block_id(block)?;
                let found = self.planner()?.block(id)?;
                ensure!(
                    found.location == BlockLocation::Unscheduled && found.week_start_date.is_none(),
                    "'{}' should be in the tray, is at {:?}",
                    block,
                    found.location
                );
                Ok(())
            }
            Assertion::BlockAt { block, pos } => {
                let id = self.block_id(block)?;
                let found = self.planner()?.block(id)?;
                ensure!(
                    found.slot() == Some(*pos),
                    "'{}' should be at {}, is at {:?}",
                    block,
                    pos,
                    found.location
                );
                Ok(())
            }
            Assertion::BlockCompleted { block, completed } => {
                let id = self.block_id(block)?;
                let found = self.planner()?.block(id)?;
                ensure!(
                    found.completed == *completed,
                    "'{}' completed = {}, expected {}",
                    block,
                    found.completed,
                    completed
                );
                Ok(())
            }
            Assertion::PlainBlock(block) => {
                let id = self.block_id(block)?;
                let found = self.planner()?.block(id)?;
                ensure!(
                    !found.is_habit_block && found.habit_id.is_none(),
                    "'{}' should be a plain block",
                    block
                );
                Ok(())
            }
            Assertion::HabitDone { habit, count } => {
                let id = self.habit_id(habit)?;
                let found = self.planner()?.habit(id)?;
                ensure!(
                    found.done_count == *count,
                    "'{}' done {} time(s), expected {}",
                    habit,
                    found.done_count,
                    count
                );
                Ok(())
            }
            Assertion::LastPassWrites(expected) => {
                let writes = self.last_report()?.writes;
                ensure!(
                    writes == *expected,
                    "Last pass wrote {} time(s), expected {}",
                    writes,
                    expected
                );
                Ok(())
            }
            Assertion::LastPassNoop => {
                let report = self.last_report()?;
                ensure!(report.is_noop(), "Last pass was not a no-op: {:?}", report);
                Ok(())
            }
            Assertion::LastPassDeleted(expected) => {
                let deleted = self.last_report()?.sessions_deleted;
                ensure!(
                    deleted == *expected,
                    "Last pass deleted {} session(s), expected {}",
                    deleted,
                    expected
                );
                Ok(())
            }
            Assertion::LastPassCreated(expected) => {
                let created = self.last_report()?.sessions_created;
                ensure!(
                    created == *expected,
                    "Last pass created {} session(s), expected {}",
                    created,
                    expected
                );
                Ok(())
            }
            Assertion::Stable => {
                let report = self.planner_mut()?.reconcile()?;
                ensure!(report.is_noop(), "Store was not settled: {:?}", report);
                Ok(())
            }
            Assertion::Consistent => self.assert_consistent(),
            Assertion::LockHeld => match self.workspace.open_planner() {
                Ok(_) => bail!("Second open should fail while the planner is held"),
                Err(e) => match e.downcast_ref::<PlannerError>() {
                    Some(PlannerError::LockHeld { .. }) | Some(PlannerError::Locked) => Ok(()),
                    _ => Err(e.context("Second open failed for the wrong reason")),
                },
            },
            Assertion::NoPanic => Ok(()), // If we're here, we didn't panic
            Assertion::Custom(f) => {
                let planner = self.planner_mut()?;
                f(planner)
            }
        }
    }

    fn assert_same_session(&self, blocks: &[String]) -> Result<()> {
        let mut shared: Option<SessionGroupId> = None;
        for alias in blocks {
            let session = self
                .session_of(alias)?
                .ok_or_else(|| anyhow!("'{}' is not linked", alias))?;
            match shared {
                None => shared = Some(session),
                Some(first) => ensure!(
                    first == session,
                    "'{}' is in a different session than '{}'",
                    alias,
                    blocks[0]
                ),
            }
        }
        let shared = shared.ok_or_else(|| anyhow!("No blocks named"))?;
        ensure!(
            self.planner()?.sessions()?.iter().any(|s| s.id == shared),
            "Shared session {} is not stored this week",
            shared
        );
        Ok(())
    }

    /// Every reference points at a stored session, every session has at least
    /// two members, and numbers are unique.
    fn assert_consistent(&self) -> Result<()> {
        let planner = self.planner()?;
        let sessions = planner.sessions()?;
        let mut members: BTreeMap<SessionGroupId, usize> =
            sessions.iter().map(|s| (s.id, 0)).collect();

        for block in planner.week_blocks()? {
            if let Some(session) = block.session_group_id {
                let count = members
                    .get_mut(&session)
                    .ok_or_else(|| anyhow!("Block {} points at missing session {}", block.id, session))?;
                *count += 1;
            }
        }
        for session in &sessions {
            let count = members.get(&session.id).copied().unwrap_or(0);
            ensure!(
                count >= 2,
                "{} has {} member(s)",
                session.display_name(),
                count
            );
        }

        let mut numbers: Vec<u32> = sessions.iter().map(|s| s.session_number).collect();
        numbers.dedup();
        ensure!(
            numbers.len() == sessions.len(),
            "Duplicate session numbers in {:?}",
            sessions.iter().map(|s| s.session_number).collect::<Vec<_>>()
        );
        Ok(())
    }
}
