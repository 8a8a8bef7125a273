//! Planner CLI - Command-line interface for the weekly habit planner.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use planner_core::PlannerError;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Weekly habit planner with automatic training sessions", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory containing the .planner folder
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new planner
    Init {
        /// Owner of the records (default: "local")
        #[arg(long)]
        user: Option<String>,
    },
    /// Manage themes
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Manage habits
    Habit {
        #[command(subcommand)]
        command: HabitCommands,
    },
    /// Manage habit groups
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },
    /// Manage blocks on the weekly grid
    Block {
        #[command(subcommand)]
        command: BlockCommands,
    },
    /// Inspect and name sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Recompute sessions from the current grid
    Reconcile,
    /// Weekly progress
    Week {
        #[command(subcommand)]
        command: WeekCommands,
    },
    /// Configure the grid
    Grid {
        #[command(subcommand)]
        command: GridCommands,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Create a theme
    Add {
        /// Theme name
        name: String,
    },
    /// List themes
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a theme
    Rename {
        /// Theme name or id prefix
        theme: String,
        /// New name
        name: String,
    },
    /// Delete a theme with its habits and groups
    Delete {
        /// Theme name or id prefix
        theme: String,
    },
}

#[derive(Subcommand)]
enum HabitCommands {
    /// Create a habit
    Add {
        /// Habit name
        name: String,
        /// Theme name or id prefix
        #[arg(short, long)]
        theme: String,
        /// Completions per period
        #[arg(long, default_value = "1")]
        target: u32,
        /// Period (daily, weekly, monthly, none)
        #[arg(short, long, default_value = "weekly")]
        frequency: String,
    },
    /// List habits with progress
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a completion
    Done {
        /// Habit name or id prefix
        habit: String,
    },
    /// Take back a completion
    Undo {
        /// Habit name or id prefix
        habit: String,
    },
    /// Put a habit into a group, or take it out
    Group {
        /// Habit name or id prefix
        habit: String,
        /// Group name or id prefix
        group: Option<String>,
        /// Remove the habit from its group
        #[arg(long, conflicts_with = "group")]
        clear: bool,
    },
    /// Delete a habit (its blocks are kept as plain blocks)
    Delete {
        /// Habit name or id prefix
        habit: String,
    },
}

#[derive(Subcommand)]
enum GroupCommands {
    /// Create a habit group
    Add {
        /// Group name
        name: String,
        /// Theme name or id prefix
        #[arg(short, long)]
        theme: String,
        /// Group type (strength-training, custom)
        #[arg(long = "type", default_value = "custom")]
        group_type: String,
    },
    /// List habit groups
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a habit group (its habits are kept)
    Delete {
        /// Group name or id prefix
        group: String,
    },
}

#[derive(Subcommand)]
enum BlockCommands {
    /// Create a block in the tray
    Add {
        /// Block label
        label: String,
        /// Tag shown on the block
        #[arg(long)]
        tag: Option<String>,
    },
    /// Place a habit on the grid
    Place {
        /// Habit name or id prefix
        habit: String,
        /// Day (0-6 or mon..sun)
        day: String,
        /// Time slot (index or label)
        time: String,
    },
    /// Move a block to a grid cell
    Move {
        /// Block id prefix
        block: String,
        /// Day (0-6 or mon..sun)
        day: String,
        /// Time slot (index or label)
        time: String,
    },
    /// Move a block back to the tray
    Unschedule {
        /// Block id prefix
        block: String,
    },
    /// Delete a block
    Delete {
        /// Block id prefix
        block: String,
    },
    /// Check or uncheck a habit block
    Toggle {
        /// Block id prefix
        block: String,
    },
    /// List this week's blocks and the tray
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List this week's sessions
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Name a session, or clear its name
    Rename {
        /// Session number or id prefix
        session: String,
        /// New name (omit to clear)
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum WeekCommands {
    /// Show completed blocks against what is scheduled
    Summary {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Zero every habit's progress and uncheck every block
    Reset,
}

#[derive(Subcommand)]
enum GridCommands {
    /// Show the grid for this week
    Show {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Switch between hourly slots and buckets
    Mode {
        /// hourly or buckets
        granularity: String,
    },
    /// Append a bucket
    AddBucket {
        /// Bucket name
        name: String,
    },
    /// Rename a bucket
    RenameBucket {
        /// Bucket index
        index: usize,
        /// New name
        name: String,
    },
    /// Remove a bucket
    RemoveBucket {
        /// Bucket index
        index: usize,
    },
}

fn main() {
    // Respects RUST_LOG (e.g. RUST_LOG=planner_core=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", style("error:").red().bold(), err);
        let hint = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<PlannerError>())
            .and_then(PlannerError::recovery_suggestion);
        if let Some(hint) = hint {
            eprintln!("  {} {}", style("hint:").cyan(), hint);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = cli.dir.as_path();
    match cli.command {
        Commands::Init { user } => commands::init::run(dir, user.as_deref()),
        Commands::Theme { command } => match command {
            ThemeCommands::Add { name } => commands::theme::add(dir, &name),
            ThemeCommands::List { json } => commands::theme::list(dir, json),
            ThemeCommands::Rename { theme, name } => commands::theme::rename(dir, &theme, &name),
            ThemeCommands::Delete { theme } => commands::theme::delete(dir, &theme),
        },
        Commands::Habit { command } => match command {
            HabitCommands::Add {
                name,
                theme,
                target,
                frequency,
            } => commands::habit::add(dir, &name, &theme, target, &frequency),
            HabitCommands::List { json } => commands::habit::list(dir, json),
            HabitCommands::Done { habit } => commands::habit::done(dir, &habit),
            HabitCommands::Undo { habit } => commands::habit::undo(dir, &habit),
            HabitCommands::Group {
                habit,
                group,
                clear,
            } => commands::habit::set_group(dir, &habit, group.as_deref(), clear),
            HabitCommands::Delete { habit } => commands::habit::delete(dir, &habit),
        },
        Commands::Group { command } => match command {
            GroupCommands::Add {
                name,
                theme,
                group_type,
            } => commands::group::add(dir, &name, &theme, &group_type),
            GroupCommands::List { json } => commands::group::list(dir, json),
            GroupCommands::Delete { group } => commands::group::delete(dir, &group),
        },
        Commands::Block { command } => match command {
            BlockCommands::Add { label, tag } => commands::block::add(dir, &label, tag.as_deref()),
            BlockCommands::Place { habit, day, time } => {
                commands::block::place(dir, &habit, &day, &time)
            }
            BlockCommands::Move { block, day, time } => {
                commands::block::move_to(dir, &block, &day, &time)
            }
            BlockCommands::Unschedule { block } => commands::block::unschedule(dir, &block),
            BlockCommands::Delete { block } => commands::block::delete(dir, &block),
            BlockCommands::Toggle { block } => commands::block::toggle(dir, &block),
            BlockCommands::List { json } => commands::block::list(dir, json),
        },
        Commands::Session { command } => match command {
            SessionCommands::List { json } => commands::session::list(dir, json),
            SessionCommands::Rename { session, name } => {
                commands::session::rename(dir, &session, name.as_deref())
            }
        },
        Commands::Reconcile => commands::reconcile::run(dir),
        Commands::Week { command } => match command {
            WeekCommands::Summary { json } => commands::week::summary(dir, json),
            WeekCommands::Reset => commands::week::reset(dir),
        },
        Commands::Grid { command } => match command {
            GridCommands::Show { json } => commands::grid::show(dir, json),
            GridCommands::Mode { granularity } => commands::grid::mode(dir, &granularity),
            GridCommands::AddBucket { name } => commands::grid::add_bucket(dir, &name),
            GridCommands::RenameBucket { index, name } => {
                commands::grid::rename_bucket(dir, index, &name)
            }
            GridCommands::RemoveBucket { index } => commands::grid::remove_bucket(dir, index),
        },
    }
}
