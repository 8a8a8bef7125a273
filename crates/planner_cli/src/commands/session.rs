//! Session commands.

use super::{open, print_json};
use anyhow::{bail, Result};
use console::style;
use planner_core::SessionGroup;
use std::path::Path;

pub fn list(dir: &Path, json: bool) -> Result<()> {
    let planner = open(dir)?;
    let sessions = planner.sessions()?;
    if json {
        return print_json(&sessions);
    }
    if sessions.is_empty() {
        println!("No sessions this week.");
        return Ok(());
    }

    let blocks = planner.week_blocks()?;
    for session in &sessions {
        let members: Vec<&str> = blocks
            .iter()
            .filter(|b| b.session_group_id == Some(session.id))
            .map(|b| b.label.as_str())
            .collect();
        println!(
            "{:>2}. {}  {}  {}",
            session.session_number,
            style(session.display_name()).bold(),
            style(session.accent_color).cyan(),
            style(session.id.short()).dim()
        );
        println!("    {}", members.join(", "));
    }
    Ok(())
}

pub fn rename(dir: &Path, query: &str, name: Option<&str>) -> Result<()> {
    let mut planner = open(dir)?;
    let sessions = planner.sessions()?;
    let query = query.trim().to_ascii_lowercase();

    let matches: Vec<&SessionGroup> = match query.parse::<u32>() {
        Ok(number) => sessions
            .iter()
            .filter(|s| s.session_number == number)
            .collect(),
        Err(_) => sessions
            .iter()
            .filter(|s| query.len() >= 4 && s.id.to_string().starts_with(&query))
            .collect(),
    };
    let session = match matches.as_slice() {
        [session] => *session,
        [] => bail!("no session this week matches '{}'", query),
        _ => bail!("'{}' matches more than one session", query),
    };

    let renamed = planner.rename_session(session.id, name)?;
    println!(
        "{} Session {} is now {}",
        style("✓").green(),
        renamed.session_number,
        style(renamed.display_name()).bold()
    );
    Ok(())
}
