//! Habit commands.

use super::theme::find_theme;
use super::{open, pick, print_json, print_report};
use anyhow::{bail, Result};
use console::style;
use planner_core::{Frequency, Habit, HabitGroup, Planner};
use std::path::Path;

pub(crate) fn find_habit(planner: &Planner, query: &str) -> Result<Habit> {
    let habits = planner.habits()?;
    pick(&habits, query, "habit", |h| h.id.to_string(), |h| h.name.as_str()).cloned()
}

pub(crate) fn find_group(planner: &Planner, query: &str) -> Result<HabitGroup> {
    let groups = planner.habit_groups()?;
    pick(&groups, query, "group", |g| g.id.to_string(), |g| g.name.as_str()).cloned()
}

fn progress(habit: &Habit) -> String {
    if habit.frequency == Frequency::None {
        format!("{} done", habit.done_count)
    } else {
        format!(
            "{}/{} {}",
            habit.done_count, habit.target_count, habit.frequency
        )
    }
}

pub fn add(dir: &Path, name: &str, theme: &str, target: u32, frequency: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let theme = find_theme(&planner, theme)?;
    let frequency: Frequency = frequency.parse()?;
    let habit = planner.create_habit(theme.id, name, target, frequency)?;
    println!(
        "{} Created habit {} in {} ({})",
        style("✓").green(),
        style(&habit.name).bold(),
        theme.name,
        habit.id.short()
    );
    Ok(())
}

pub fn list(dir: &Path, json: bool) -> Result<()> {
    let planner = open(dir)?;
    let habits = planner.habits()?;
    if json {
        return print_json(&habits);
    }
    if habits.is_empty() {
        println!("No habits yet.");
        return Ok(());
    }

    let themes = planner.themes()?;
    let groups = planner.habit_groups()?;
    for theme in &themes {
        let members: Vec<&Habit> = habits.iter().filter(|h| h.theme_id == theme.id).collect();
        if members.is_empty() {
            continue;
        }
        println!("{}", style(&theme.name).bold());
        for habit in members {
            let group = habit
                .habit_group_id
                .and_then(|id| groups.iter().find(|g| g.id == id))
                .map(|g| format!(" [{}]", g.name))
                .unwrap_or_default();
            let reached =
                habit.frequency != Frequency::None && habit.done_count >= habit.target_count;
            println!(
                "  {}  {:<24} {}{}",
                style(habit.id.short()).dim(),
                habit.name,
                if reached {
                    style(progress(habit)).green()
                } else {
                    style(progress(habit)).yellow()
                },
                style(group).dim()
            );
        }
    }
    Ok(())
}

pub fn done(dir: &Path, query: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let habit = find_habit(&planner, query)?;
    let habit = planner.increment_habit(habit.id)?;
    println!(
        "{} {}: {}",
        style("✓").green(),
        habit.name,
        progress(&habit)
    );
    Ok(())
}

pub fn undo(dir: &Path, query: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let habit = find_habit(&planner, query)?;
    let habit = planner.decrement_habit(habit.id)?;
    println!("{} {}: {}", style("↺").cyan(), habit.name, progress(&habit));
    Ok(())
}

pub fn set_group(dir: &Path, query: &str, group: Option<&str>, clear: bool) -> Result<()> {
    let mut planner = open(dir)?;
    let habit = find_habit(&planner, query)?;
    let group = match (group, clear) {
        (Some(group), false) => Some(find_group(&planner, group)?),
        (None, true) => None,
        _ => bail!("give a group name, or --clear to remove the habit from its group"),
    };

    let report = planner.set_habit_group(habit.id, group.as_ref().map(|g| g.id))?;
    match group {
        Some(group) => println!(
            "{} {} is now in {}",
            style("✓").green(),
            habit.name,
            style(&group.name).bold()
        ),
        None => println!("{} {} has no group", style("✓").green(), habit.name),
    }
    print_report(&report);
    Ok(())
}

pub fn delete(dir: &Path, query: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let habit = find_habit(&planner, query)?;
    let report = planner.delete_habit(habit.id)?;
    println!(
        "{} Deleted habit {} (its blocks stay as plain blocks)",
        style("✓").green(),
        habit.name
    );
    print_report(&report);
    Ok(())
}
