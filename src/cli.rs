//! Command-line argument parsing for sqlens.

use clap::Parser;
use std::path::PathBuf;

/// Browse SQLite databases and run ad-hoc queries through the sqlite3 CLI.
#[derive(Parser, Debug)]
#[command(name = "sqlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(value_name = "DATABASE")]
    pub database: PathBuf,

    /// SQL to execute (one or more ;-separated statements)
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Print the database schema instead of running a query
    #[arg(short, long)]
    pub schema: bool,

    /// Sqlite binary to invoke (overrides the config file)
    #[arg(short = 'c', long, env = "SQLENS_COMMAND", value_name = "COMMAND")]
    pub command: Option<String>,

    /// Path to the config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit results as JSON instead of a text table
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
