use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Clears completed recurring tasks once their next period begins.
/// Storage defaults to ~/.recur/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "recur", version, about = "Recurring task reset engine")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Evaluate as of this RFC 3339 instant instead of the local clock.
    #[arg(long, global = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
