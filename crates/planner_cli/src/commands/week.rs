//! Weekly progress commands.

use super::{open, print_json};
use anyhow::Result;
use console::style;
use std::path::Path;

pub fn summary(dir: &Path, json: bool) -> Result<()> {
    let planner = open(dir)?;
    let summary = planner.week_summary()?;
    if json {
        return print_json(&summary);
    }

    println!(
        "{} {}  {}/{} done ({}%)",
        style("Week of").bold(),
        summary.week_start_date,
        summary.completed,
        summary.scheduled,
        summary.percent
    );
    for habit in &summary.habits {
        let count = format!("{:>7}", format!("{}/{}", habit.completed, habit.target));
        println!(
            "  {:<24} {}  {}",
            habit.name,
            if habit.reached {
                style(count).green()
            } else {
                style(count).yellow()
            },
            style(format!("{}%", habit.percent)).dim()
        );
    }
    Ok(())
}

pub fn reset(dir: &Path) -> Result<()> {
    let mut planner = open(dir)?;
    planner.reset_week()?;
    println!(
        "{} Reset all habit progress and unchecked every block",
        style("✓").green()
    );
    Ok(())
}
