//! Command implementations for the CLI interface.
//!
//! Each handler loads the task file, applies one operation and saves only when
//! the task list actually changed.

use std::fmt::Display;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use tracing::info;

use recur::db::Database;
use recur::{evaluate, needs_reset, Error, Result, Task, KIND_CATALOG};

use crate::cli::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Clear completed tasks whose schedule has started a new period, then save.
    Reset,

    /// Show which tasks a reset would clear, without saving.
    Check,

    /// List tasks with their schedules.
    List {
        /// Only tasks with an active schedule.
        #[arg(long)]
        recurring: bool,
        /// Only completed tasks.
        #[arg(long)]
        completed: bool,
    },

    /// Mark a task completed, stamping its completion time.
    Complete {
        /// Task ID.
        id: String,
    },

    /// Mark a task not completed. The last completion time is kept.
    Reopen {
        /// Task ID.
        id: String,
    },

    /// Print the recognised recurrence kinds.
    Kinds,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Dispatch one command against the task file at `db_path`, evaluated at `now`.
pub fn run<Tz>(command: Commands, db_path: &Path, now: &DateTime<Tz>) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match command {
        Commands::Kinds => {
            cmd_kinds();
            Ok(())
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
        Commands::Reset => cmd_reset(db_path, now),
        Commands::Check => cmd_check(db_path, now),
        Commands::List {
            recurring,
            completed,
        } => cmd_list(db_path, now, recurring, completed),
        Commands::Complete { id } => cmd_set_completed(db_path, &id, true, now.with_timezone(&Utc)),
        Commands::Reopen { id } => cmd_set_completed(db_path, &id, false, now.with_timezone(&Utc)),
    }
}

/// Evaluate all tasks and persist the result if any task was cleared.
pub fn cmd_reset<Tz>(db_path: &Path, now: &DateTime<Tz>) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut db = Database::load(db_path)?;
    let cleared: Vec<String> = db
        .tasks
        .iter()
        .filter(|t| needs_reset(t, now))
        .map(|t| t.to_string())
        .collect();
    let updated = evaluate(&db.tasks, now);
    if !db.replace_tasks(updated) {
        println!("Nothing to reset at {now}.");
        return Ok(());
    }
    db.save(db_path)?;
    info!("reset {} task(s) in {}", cleared.len(), db_path.display());
    for line in &cleared {
        println!("Reset {line}");
    }
    Ok(())
}

/// Dry run of [`cmd_reset`].
pub fn cmd_check<Tz>(db_path: &Path, now: &DateTime<Tz>) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let db = Database::load(db_path)?;
    let due: Vec<&Task> = db.tasks.iter().filter(|t| needs_reset(t, now)).collect();
    if due.is_empty() {
        println!("Nothing would reset at {now}.");
        return Ok(());
    }
    println!("Would reset at {now}:");
    print_table(&due, now);
    Ok(())
}

pub fn cmd_list<Tz>(db_path: &Path, now: &DateTime<Tz>, recurring: bool, completed: bool) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let db = Database::load(db_path)?;
    let shown: Vec<&Task> = db
        .tasks
        .iter()
        .filter(|t| !recurring || t.is_recurring())
        .filter(|t| !completed || t.completed)
        .collect();
    if shown.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    print_table(&shown, now);
    Ok(())
}

/// The toggle-completion side effect, applied to one task by id.
pub fn cmd_set_completed(db_path: &Path, id: &str, done: bool, now: DateTime<Utc>) -> Result<()> {
    let mut db = Database::load(db_path)?;
    let task = db
        .get_mut(id)
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
    if task.completed == done {
        println!("{task} unchanged");
        return Ok(());
    }
    task.set_completed(done, now);
    let line = task.to_string();
    db.save(db_path)?;
    println!("{} {line}", if done { "Completed" } else { "Reopened" });
    Ok(())
}

pub fn cmd_kinds() {
    for kind in KIND_CATALOG {
        println!("{kind}");
    }
    println!();
    println!("Also accepted: <first|second|third|fourth|last>_<weekday> for any weekday.");
    println!("`weekly` needs dayOfWeek (0 = Sunday); `monthly` takes dayOfMonth (default 1).");
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Print tasks as a table; completion times are shown in the zone of `now`.
pub fn print_table<Tz>(tasks: &[&Task], now: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    println!(
        "{:<14} {:<4} {:<18} {:<17} {}",
        "ID", "Done", "Schedule", "Last completed", "Title"
    );
    let zone = now.timezone();
    for t in tasks {
        let kind = t
            .rule()
            .map(|r| r.kind_name())
            .unwrap_or_else(|| "-".into());
        let last = t
            .last_completed_at
            .map(|at| at.with_timezone(&zone).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<14} {:<4} {:<18} {:<17} {}",
            truncate(&t.id.to_string(), 14),
            if t.completed { "x" } else { "" },
            truncate(&kind, 18),
            last,
            t.title
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
