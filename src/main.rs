//! # recur - recurring task reset CLI
//!
//! Thin driver around the reset engine in the `recur` library. It reads a JSON
//! task file, clears tasks whose schedule has started a new period, and writes
//! the file back only when something changed.
//!
//! ## Quick Start
//!
//! ```bash
//! # What would be cleared right now?
//! recur check
//!
//! # Clear and save (run from cron or a timer, e.g. once a minute)
//! recur reset
//!
//! # Evaluate as of a fixed instant
//! recur --now 2024-03-08T09:30:00+01:00 check
//!
//! # Complete a task; this stamps lastCompletedAt
//! recur complete 1712345678901
//! ```
//!
//! Data lives in `~/.recur/tasks.json` unless `--db` is given. Set `RUST_LOG=recur=debug`
//! to see each reset decision.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;

use cli::Cli;
use recur::{Error, Result};

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".recur").join("tasks.json")
}

fn run(cli: Cli) -> Result<()> {
    let db_path = cli.db.unwrap_or_else(default_db_path);
    match cli.now {
        Some(raw) => {
            let now = DateTime::parse_from_rfc3339(&raw).map_err(|_| Error::InvalidInstant(raw))?;
            cmd::run(cli.command, &db_path, &now)
        }
        None => cmd::run(cli.command, &db_path, &Local::now()),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recur=warn")),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
