//! Manual reconciliation.

use super::open;
use anyhow::Result;
use console::style;
use std::path::Path;

/// Recompute sessions, e.g. after a failed write left them half updated.
pub fn run(dir: &Path) -> Result<()> {
    let mut planner = open(dir)?;
    let report = planner.reconcile()?;

    if report.is_noop() {
        println!(
            "{} Sessions for the week of {} are up to date ({} group(s))",
            style("✓").green(),
            report.week_start_date,
            report.groups_found
        );
        return Ok(());
    }

    println!("{}", style("Reconciliation Report:").bold());
    println!("  Week:              {}", report.week_start_date);
    println!("  Groups found:      {}", style(report.groups_found).cyan());
    println!("  Sessions created:  {}", style(report.sessions_created).green());
    println!("  Sessions reused:   {}", report.sessions_reused);
    println!("  Sessions deleted:  {}", style(report.sessions_deleted).yellow());
    println!("  Blocks linked:     {}", report.blocks_assigned);
    println!("  Blocks unlinked:   {}", report.blocks_cleared);
    println!("  Writes:            {}", report.writes);
    Ok(())
}
