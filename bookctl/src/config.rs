//! The bookctl configuration file. It holds the location of the database and
//! the settings that are passed through to the database engine.
use anyhow::{Context, Result, anyhow};
use libbookstore::core::database::{ConnectOptions, DEFAULT_DATABASE_FILE};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::{
    fs::{File, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub database: PathBuf,
    /// milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub busy_timeout: Option<u64>,
    /// milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE_FILE),
            busy_timeout: None,
            acquire_timeout: None,
            max_connections: None,
        }
    }
}

impl Config {
    fn parse(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).with_context(|| "Couldn't parse json string")
    }

    fn format(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Couldn't convert config to json")
    }

    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        debug!(?p, "Trying to load config");
        let contents = read_to_string(p)
            .await
            .with_context(|| format!("Failed to read config file '{}'", p.display()))?;
        Self::parse(&contents)
    }

    /// Load the config file at the given path, or use the defaults if there is
    /// no such file
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        match tokio::fs::try_exists(p).await? {
            true => Self::load_from_file(p).await,
            false => {
                debug!(?p, "No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!(?path, "Saving config");
        if let Some(parent) = path.parent() {
            create_dir_all(parent).await?;
        }
        let mut file = File::create(path).await?;
        let serialized = self.format()?;
        file.write_all(serialized.as_bytes())
            .await
            .with_context(|| "Failed to write config file")?;
        Ok(())
    }

    /// The settings to open the database with
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            busy_timeout: self.busy_timeout.map(Duration::from_millis),
            acquire_timeout: self.acquire_timeout.map(Duration::from_millis),
            max_connections: self.max_connections,
            ..Default::default()
        }
    }
}

/// The default location of the config file in the user's config directory
pub fn config_file() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("org", "plp", "bookctl")
        .ok_or_else(|| anyhow!("Cannot find default project config directory"))?;
    Ok(project_dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let cfg = Config::parse(r#"{"database": "/srv/books.sqlite", "busy_timeout": 5000}"#)
            .expect("Failed to parse config");
        assert_eq!(cfg.database, PathBuf::from("/srv/books.sqlite"));
        assert_eq!(cfg.busy_timeout, Some(5000));
        assert_eq!(cfg.max_connections, None);

        let opts = cfg.connect_options();
        assert_eq!(opts.busy_timeout, Some(Duration::from_secs(5)));
        assert_eq!(opts.acquire_timeout, None);
        assert!(opts.create_if_missing);

        assert!(Config::parse(r#"{"busy_timeout": 5000}"#).is_err());
        assert!(Config::parse("not json").is_err());
    }

    #[test]
    fn test_format_config() {
        let cfg = Config {
            max_connections: Some(4),
            ..Default::default()
        };
        let json = cfg.format().expect("Failed to format config");
        assert!(!json.contains("busy_timeout"));
        assert_eq!(Config::parse(&json).unwrap(), cfg);
        assert_eq!(
            Config::default().database,
            PathBuf::from("plp_bookstore.sqlite")
        );
    }
}
