//! Commands that manage the bookctl configuration file
use crate::{
    cli::ConfigCommands,
    config::Config,
    output::{self, OutputFormat, rows::ConfigRow},
};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Handle the `bookctl config` command and its subcommands
pub(crate) async fn handle_command(
    command: ConfigCommands,
    database: Option<PathBuf>,
    config_file: &Path,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let mut cfg = Config::load_or_default(config_file).await?;
            if let Some(db) = database {
                cfg.database = db;
            }
            let row = ConfigRow {
                file: config_file.display().to_string(),
                database: cfg.database.display().to_string(),
                busy_timeout: cfg.busy_timeout,
                acquire_timeout: cfg.acquire_timeout,
                max_connections: cfg.max_connections,
            };
            println!("{}", output::format_one(row, OutputFormat::Table)?);
            Ok(())
        }
        ConfigCommands::Init {
            busy_timeout,
            acquire_timeout,
            max_connections,
        } => {
            let cfg = Config {
                database: database.unwrap_or_else(|| Config::default().database),
                busy_timeout,
                acquire_timeout,
                max_connections,
            };
            cfg.save_to_file(config_file).await?;
            println!("Wrote configuration to '{}'", config_file.display());
            Ok(())
        }
    }
}
