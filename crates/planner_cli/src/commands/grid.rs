//! Grid commands.

use super::{open, print_json, print_report};
use anyhow::Result;
use console::style;
use planner_core::{Block, GridChange, GridPos, Granularity, DAY_NAMES};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct GridView<'a> {
    granularity: Granularity,
    days: &'a [&'a str],
    slots: Vec<String>,
    blocks: &'a [Block],
}

pub fn show(dir: &Path, json: bool) -> Result<()> {
    let planner = open(dir)?;
    let grid = &planner.config().grid;
    let blocks = planner.week_blocks()?;
    let slots = grid.slot_labels();

    if json {
        return print_json(&GridView {
            granularity: grid.granularity,
            days: &DAY_NAMES,
            slots,
            blocks: &blocks,
        });
    }

    let sessions = planner.sessions()?;
    println!(
        "{} {}  ({})",
        style("Week of").bold(),
        planner.current_week()?,
        grid.granularity
    );

    let label_width = slots.iter().map(|s| s.len()).max().unwrap_or(0);
    print!("{:>2} {:<width$}", "", "", width = label_width);
    for day in DAY_NAMES {
        print!(" {:<10}", day);
    }
    println!();

    for (time_index, label) in slots.iter().enumerate() {
        print!("{:>2} {:<width$}", time_index, label, width = label_width);
        for day_index in 0..DAY_NAMES.len() {
            let pos = GridPos::new(
                u8::try_from(day_index).unwrap_or(u8::MAX),
                u16::try_from(time_index).unwrap_or(u16::MAX),
            );
            let here: Vec<&Block> = blocks.iter().filter(|b| b.slot() == Some(pos)).collect();
            let cell = match here.as_slice() {
                [] => style("·".to_string()).dim(),
                [block] => {
                    let mut text: String = block.label.chars().take(10).collect();
                    if block.completed {
                        text = format!("✓{}", text.chars().take(9).collect::<String>());
                    }
                    let in_session = block
                        .session_group_id
                        .is_some_and(|id| sessions.iter().any(|s| s.id == id));
                    if in_session {
                        style(text).cyan()
                    } else {
                        style(text)
                    }
                }
                many => style(format!("{} blocks", many.len())).yellow(),
            };
            print!(" {:<10}", cell);
        }
        println!();
    }

    let tray = blocks.iter().filter(|b| b.slot().is_none()).count();
    if tray > 0 {
        println!();
        println!("{} block(s) in the tray", tray);
    }
    Ok(())
}

fn print_change(change: &GridChange) {
    if !change.moved_to_tray.is_empty() {
        println!(
            "  {} {} block(s) no longer fit and were moved to the tray",
            style("!").yellow(),
            change.moved_to_tray.len()
        );
    }
    print_report(&change.report);
}

pub fn mode(dir: &Path, granularity: &str) -> Result<()> {
    let mut planner = open(dir)?;
    let granularity: Granularity = granularity.parse()?;
    let change = planner.set_granularity(granularity)?;
    println!(
        "{} Grid is now {} ({} slots per day)",
        style("✓").green(),
        granularity,
        planner.config().grid.slot_count()
    );
    print_change(&change);
    Ok(())
}

pub fn add_bucket(dir: &Path, name: &str) -> Result<()> {
    let mut planner = open(dir)?;
    planner.add_bucket(name)?;
    let buckets = &planner.config().grid.buckets;
    println!(
        "{} Added bucket {} ({})",
        style("✓").green(),
        style(buckets.last().map(String::as_str).unwrap_or_default()).bold(),
        buckets.len() - 1
    );
    Ok(())
}

pub fn rename_bucket(dir: &Path, index: usize, name: &str) -> Result<()> {
    let mut planner = open(dir)?;
    planner.rename_bucket(index, name)?;
    println!("{} Bucket {} renamed", style("✓").green(), index);
    Ok(())
}

pub fn remove_bucket(dir: &Path, index: usize) -> Result<()> {
    let mut planner = open(dir)?;
    let change = planner.remove_bucket(index)?;
    println!(
        "{} Removed bucket {}; {} bucket(s) left",
        style("✓").green(),
        index,
        planner.config().grid.buckets.len()
    );
    print_change(&change);
    Ok(())
}
