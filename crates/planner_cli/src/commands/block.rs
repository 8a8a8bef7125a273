//! Block commands.

use super::habit::find_habit;
use super::{open, parse_slot, print_json, print_report};
use anyhow::{bail, Result};
use console::style;
use planner_core::{Block, BlockLocation, Planner, DAY_NAMES};
use std::path::Path;

fn find_block(planner: &Planner, query: &str) -> Result<Block> {
    let query = query.trim().to_ascii_lowercase();
    if query.len() < 4 {
        bail!("block ids need at least 4 characters");
    }
    let blocks = planner.week_blocks()?;
    let matches: Vec<&Block> = blocks
        .iter()
        .filter(|b| b.id.to_string().starts_with(&query))
        .collect();
    match matches.as_slice() {
        [block] => Ok((*block).clone()),
        [] => bail!("no block this week matches '{}'", query),
        _ => bail!("'{}' matches more than one block; use a longer prefix", query),
    }
}

fn describe(planner: &Planner, block: &Block) -> String {
    match block.location {
        BlockLocation::Unscheduled => "tray".to_string(),
        BlockLocation::Slot(pos) => {
            let day = DAY_NAMES
                .get(usize::from(pos.day_index))
                .copied()
                .unwrap_or("?");
            let time = planner
                .config()
                .grid
                .slot_labels()
                .get(usize::from(pos.time_index))
                .cloned()
                .unwrap_or_else(|| format!("slot {}", pos.time_index));
            format!("{} {}", day, time)
        }
    }
}

pub fn add(dir: &Path, label: &str, tag: Option<&str>) -> Result<()> {
    let mut planner = open(dir)?;
    let block = planner.create_block(label, tag)?;
    println!(
        "{} Added {} to the tray ({})",
        style("✓").green(),
        style(&block.label).bold(),
        block.id.short()
    );
    Ok(())
}

pub fn place(dir: &Path, habit: &str, day: &str, time: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let habit = find_habit(&planner, habit)?;
    let pos = parse_slot(&planner, day, time)?;
    let (block, report) = planner.create_habit_block_at(habit.id, pos)?;
    println!(
        "{} Placed {} on {} ({})",
        style("✓").green(),
        style(&block.label).bold(),
        describe(&planner, &block),
        block.id.short()
    );
    print_report(&report);
    Ok(())
}

pub fn move_to(dir: &Path, query: &str, day: &str, time: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let block = find_block(&planner, query)?;
    let pos = parse_slot(&planner, day, time)?;
    let report = planner.move_block(block.id, pos)?;
    let moved = planner.block(block.id)?;
    println!(
        "{} Moved {} to {}",
        style("✓").green(),
        style(&moved.label).bold(),
        describe(&planner, &moved)
    );
    print_report(&report);
    Ok(())
}

pub fn unschedule(dir: &Path, query: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let block = find_block(&planner, query)?;
    let report = planner.unschedule_block(block.id)?;
    println!(
        "{} Moved {} to the tray",
        style("✓").green(),
        style(&block.label).bold()
    );
    print_report(&report);
    Ok(())
}

pub fn delete(dir: &Path, query: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let block = find_block(&planner, query)?;
    let report = planner.delete_block(block.id)?;
    println!("{} Deleted {}", style("✓").green(), block.label);
    print_report(&report);
    Ok(())
}

pub fn toggle(dir: &Path, query: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let block = find_block(&planner, query)?;
    let block = planner.toggle_block_completion(block.id)?;
    if block.completed {
        println!("{} Completed {}", style("✓").green(), block.label);
    } else {
        println!("{} Reopened {}", style("↺").cyan(), block.label);
    }
    Ok(())
}

pub fn list(dir: &Path, json: bool) -> Result<()> {
    let planner = open(dir)?;
    let blocks = planner.week_blocks()?;
    if json {
        return print_json(&blocks);
    }

    let sessions = planner.sessions()?;

    let (scheduled, tray): (Vec<&Block>, Vec<&Block>) =
        blocks.iter().partition(|b| b.slot().is_some());

    println!("{} {}", style("Week of").bold(), planner.current_week()?);
    let mut scheduled = scheduled;
    scheduled.sort_by_key(|b| b.slot());
    for block in scheduled {
        let check = if block.completed { "✓" } else { " " };
        let session = block
            .session_group_id
            .and_then(|id| sessions.iter().find(|s| s.id == id))
            .map(|s| format!(" [{} · {}]", s.display_name(), s.accent_color))
            .unwrap_or_default();
        let tag = block
            .hashtag
            .as_ref()
            .map(|t| format!(" #{}", t))
            .unwrap_or_default();
        println!(
            "  {} {}  {:<18} {}{}{}",
            check,
            style(block.id.short()).dim(),
            describe(&planner, block),
            block.label,
            style(tag).dim(),
            style(session).cyan()
        );
    }

    if !tray.is_empty() {
        println!();
        println!("{}", style("Tray").bold());
        for block in tray {
            println!("    {}  {}", style(block.id.short()).dim(), block.label);
        }
    }
    Ok(())
}
