//! This is a command-line tool to seed and query the book collection via
//! [libbookstore]
use crate::{cli::*, config::Config};
use anyhow::Result;
use clap::{CommandFactory, Parser};
use libbookstore::Database;
use tracing::debug;
use tracing_subscriber::filter::EnvFilter;

mod cli;
mod commands;
mod config;
mod output;
mod prompt;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("BOOKCTL_LOG"))
        .with_writer(std::io::stderr)
        .init();
    let args = Cli::parse();
    let config_file = match args.config {
        Some(path) => path,
        None => config::config_file()?,
    };

    match args.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "bookctl", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Config { command } => {
            return commands::config::handle_command(command, args.database, &config_file).await;
        }
        _ => (),
    };

    let mut cfg = Config::load_or_default(&config_file).await?;
    if let Some(database) = args.database {
        cfg.database = database;
    }
    debug!(?cfg.database, "opening database");
    let db = Database::open_with(&cfg.database, &cfg.connect_options()).await?;

    let res = match args.command {
        // already handled above
        Commands::Completions { .. } | Commands::Config { .. } => Ok(()),
        Commands::Seed { file, format } => {
            commands::seed::handle_command(file.as_deref(), format, &db).await
        }
        Commands::Books { command } => commands::books::handle_command(command, &db).await,
        Commands::Stats {
            filter,
            output,
            command,
        } => commands::stats::handle_command(command, filter, output, &db).await,
        Commands::Index { command } => commands::indexes::handle_command(command, &db).await,
        Commands::Explain {
            filter,
            sort,
            stats,
        } => commands::explain::handle_command(filter, sort, stats, &db).await,
    };
    db.close().await;
    res
}
