use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use gator::commands::{self, Command};
use gator::config::Config;
use gator::state::State;
use gator::storage::Database;

#[derive(Parser, Debug)]
#[command(name = "gator", version, about = "Command-line RSS aggregator")]
struct Args {
    /// Config file (default: ~/.gatorconfig.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Command to run: login, register, reset, users, agg, feeds, addfeed,
    /// follow, following, unfollow, browse
    command: String,

    /// Arguments passed to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gator=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => Config::default_path().context("Failed to locate config file")?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let db_url = config.database_url()?;
    let db = Database::connect(&db_url)
        .await
        .with_context(|| format!("Failed to open database {db_url}"))?;

    let mut state = State::new(config, config_path, db);
    let registry = commands::builtin();
    registry
        .run(&mut state, Command::new(args.command, args.args))
        .await?;
    Ok(())
}
