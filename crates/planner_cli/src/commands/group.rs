//! Habit group commands.

use super::habit::find_group;
use super::theme::find_theme;
use super::{open, print_json, print_report};
use anyhow::Result;
use console::style;
use planner_core::GroupType;
use std::path::Path;

pub fn add(dir: &Path, name: &str, theme: &str, group_type: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let theme = find_theme(&planner, theme)?;
    let group_type: GroupType = group_type.parse()?;
    let group = planner.create_habit_group(theme.id, name, group_type)?;
    println!(
        "{} Created {} group {} ({})",
        style("✓").green(),
        group.group_type,
        style(&group.name).bold(),
        group.id.short()
    );
    if group.merges_adjacent() {
        println!("  Touching blocks of its habits will be merged into sessions.");
    }
    Ok(())
}

pub fn list(dir: &Path, json: bool) -> Result<()> {
    let planner = open(dir)?;
    let groups = planner.habit_groups()?;
    if json {
        return print_json(&groups);
    }
    if groups.is_empty() {
        println!("No habit groups yet.");
        return Ok(());
    }

    let habits = planner.habits()?;
    for group in &groups {
        let members: Vec<&str> = habits
            .iter()
            .filter(|h| h.habit_group_id == Some(group.id))
            .map(|h| h.name.as_str())
            .collect();
        println!(
            "{}  {}  {}",
            style(group.id.short()).dim(),
            style(&group.name).bold(),
            style(group.group_type).dim()
        );
        if !members.is_empty() {
            println!("    {}", members.join(", "));
        }
    }
    Ok(())
}

pub fn delete(dir: &Path, query: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let group = find_group(&planner, query)?;
    let report = planner.delete_habit_group(group.id)?;
    println!("{} Deleted group {}", style("✓").green(), group.name);
    print_report(&report);
    Ok(())
}
