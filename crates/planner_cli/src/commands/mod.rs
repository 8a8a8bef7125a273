//! CLI commands.

pub mod block;
pub mod grid;
pub mod group;
pub mod habit;
pub mod init;
pub mod reconcile;
pub mod session;
pub mod theme;
pub mod week;

use anyhow::{anyhow, bail, Context, Result};
use console::style;
use planner_core::{parse_day, GridPos, Planner, ReconcileReport};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Opens the planner under `dir`.
pub(crate) fn open(dir: &Path) -> Result<Planner> {
    let planner = Planner::open(dir)
        .with_context(|| format!("failed to open planner in {}", dir.display()))?;
    debug!(user = %planner.user(), week = %planner.current_week()?, "opened planner");
    Ok(planner)
}

/// Finds the single item whose id starts with `query` or whose name equals it
/// (case-insensitive).
pub(crate) fn pick<'a, T>(
    items: &'a [T],
    query: &str,
    kind: &str,
    id: impl Fn(&T) -> String,
    name: impl Fn(&T) -> &str,
) -> Result<&'a T> {
    let query = query.trim();
    let lower = query.to_ascii_lowercase();

    let by_name: Vec<&T> = items
        .iter()
        .filter(|item| name(item).eq_ignore_ascii_case(query))
        .collect();
    if by_name.len() == 1 {
        return Ok(by_name[0]);
    }

    let by_id: Vec<&T> = items
        .iter()
        .filter(|item| lower.len() >= 4 && id(item).starts_with(&lower))
        .collect();
    match (by_id.len(), by_name.len()) {
        (1, _) => Ok(by_id[0]),
        (0, 0) => bail!("no {} matches '{}'", kind, query),
        _ => bail!(
            "'{}' matches more than one {}; use a longer id prefix",
            query,
            kind
        ),
    }
}

/// Parses a day and a time slot (index or label) against the current grid.
pub(crate) fn parse_slot<S>(planner: &Planner<S>, day: &str, time: &str) -> Result<GridPos>
where
    S: planner_core::PlannerStore,
{
    let day_index = parse_day(day)?;
    let time = time.trim();
    let time_index = match time.parse::<u16>() {
        Ok(index) => index,
        Err(_) => planner
            .config()
            .grid
            .slot_labels()
            .iter()
            .position(|label| label.eq_ignore_ascii_case(time))
            .and_then(|pos| u16::try_from(pos).ok())
            .ok_or_else(|| anyhow!("no time slot named '{}'", time))?,
    };
    Ok(GridPos::new(day_index, time_index))
}

/// Prints `value` as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line summary of what a reconciliation pass changed.
pub(crate) fn print_report(report: &ReconcileReport) {
    if report.is_noop() {
        return;
    }
    let mut parts = Vec::new();
    if report.sessions_created > 0 {
        parts.push(format!("{} created", report.sessions_created));
    }
    if report.sessions_deleted > 0 {
        parts.push(format!("{} removed", report.sessions_deleted));
    }
    if report.blocks_assigned > 0 {
        parts.push(format!("{} block(s) linked", report.blocks_assigned));
    }
    if report.blocks_cleared > 0 {
        parts.push(format!("{} block(s) unlinked", report.blocks_cleared));
    }
    println!(
        "  {} sessions: {}",
        style("↻").cyan(),
        if parts.is_empty() {
            "updated".to_string()
        } else {
            parts.join(", ")
        }
    );
}
