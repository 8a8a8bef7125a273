//! Theme commands.

use super::{open, pick, print_json, print_report};
use anyhow::Result;
use console::style;
use planner_core::{Planner, Theme};
use std::path::Path;

pub(crate) fn find_theme(planner: &Planner, query: &str) -> Result<Theme> {
    let themes = planner.themes()?;
    pick(&themes, query, "theme", |t| t.id.to_string(), |t| t.name.as_str()).cloned()
}

pub fn add(dir: &Path, name: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let theme = planner.create_theme(name)?;
    println!(
        "{} Created theme {} ({})",
        style("✓").green(),
        style(&theme.name).bold(),
        theme.id.short()
    );
    Ok(())
}

pub fn list(dir: &Path, json: bool) -> Result<()> {
    let planner = open(dir)?;
    let themes = planner.themes()?;
    if json {
        return print_json(&themes);
    }
    if themes.is_empty() {
        println!("No themes yet.");
        return Ok(());
    }

    let habits = planner.habits()?;
    for theme in &themes {
        let count = habits.iter().filter(|h| h.theme_id == theme.id).count();
        println!(
            "{}  {}  {}",
            style(theme.id.short()).dim(),
            style(&theme.name).bold(),
            style(format!("{} habit(s)", count)).dim()
        );
    }
    Ok(())
}

pub fn rename(dir: &Path, query: &str, name: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let theme = find_theme(&planner, query)?;
    let renamed = planner.rename_theme(theme.id, name)?;
    println!(
        "{} Renamed theme {} to {}",
        style("✓").green(),
        theme.name,
        style(&renamed.name).bold()
    );
    Ok(())
}

pub fn delete(dir: &Path, query: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let theme = find_theme(&planner, query)?;
    let report = planner.delete_theme(theme.id)?;
    println!("{} Deleted theme {}", style("✓").green(), theme.name);
    print_report(&report);
    Ok(())
}
