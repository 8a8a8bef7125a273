//! Initialize a new planner.

use anyhow::{Context, Result};
use console::style;
use planner_core::{Planner, CONFIG_FILE, PLANNER_DIR};
use std::path::Path;

/// Initialize a new planner in `dir`.
pub fn run(dir: &Path, user: Option<&str>) -> Result<()> {
    let planner = Planner::init(dir, user).context("failed to initialize planner")?;
    let grid = &planner.config().grid;

    println!(
        "{} Initialized planner in {}/",
        style("✓").green(),
        dir.join(PLANNER_DIR).display()
    );
    println!();
    println!("  User:        {}", style(planner.user()).cyan());
    println!(
        "  Grid:        {} ({} slots per day)",
        grid.granularity,
        grid.slot_count()
    );
    println!("  Config:      {}/{}", PLANNER_DIR, CONFIG_FILE);
    println!("  Database:    {}/{}", PLANNER_DIR, planner.config().storage.database);
    println!();
    println!(
        "Next: {} then {}",
        style("planner theme add <name>").cyan(),
        style("planner habit add <name> --theme <theme>").cyan()
    );
    Ok(())
}
