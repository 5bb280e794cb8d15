//! sqlens - browse SQLite databases and run ad-hoc queries through the
//! sqlite3 CLI.

mod cli;
mod config;
mod db;
mod error;
mod output;

use cli::Cli;
use config::Config;
use error::{LensError, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match run().await {
        Ok(clean) => {
            if !clean {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Runs one invocation; returns false when the query reported a SQL error.
async fn run() -> Result<bool> {
    let cli = Cli::parse_args();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_from_file(&config_path)?;

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| config.sqlite.command.clone());
    let timeout = config.sqlite.timeout();

    if cli.schema {
        let schema = db::retrieve_schema(&command, &cli.database, timeout).await?;
        if cli.json {
            println!("{}", to_json(&schema)?);
        } else {
            print!("{}", output::render_schema(&schema));
        }
        return Ok(true);
    }

    let Some(query) = cli.query.as_deref() else {
        return Err(LensError::config(
            "no query given; pass SQL as the second argument or use --schema",
        ));
    };

    let result = db::execute_query(&command, &cli.database, query, timeout).await?;

    if let Some(result_set) = &result.result_set {
        if cli.json {
            println!("{}", to_json(result_set)?);
        } else {
            print!("{}", output::render_result_set(result_set));
        }
    }

    if let Some(query_error) = &result.error {
        eprintln!("sqlite: {query_error}");
    }

    Ok(!result.has_error())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| LensError::internal(format!("cannot serialize output: {e}")))
}
