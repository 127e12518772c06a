use crate::core::error::Result;
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, time::Duration};
use tracing::{debug, trace};

/// The name of the database that holds the book collection
pub const DATABASE_NAME: &str = "plp_bookstore";

/// The default file name for the database when no other location is configured
pub const DEFAULT_DATABASE_FILE: &str = "plp_bookstore.sqlite";

/// The name of the collection that holds the book records
pub const COLLECTION: &str = "books";

/// Settings that are handed straight through to the database engine and its
/// connection pool. Any value that is left unset keeps the driver's default.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectOptions {
    /// How long the engine waits on a locked database before giving up
    pub busy_timeout: Option<Duration>,

    /// How long to wait for a free connection from the pool
    pub acquire_timeout: Option<Duration>,

    /// The maximum number of connections the pool will open
    pub max_connections: Option<u32>,

    /// Whether to create the database file if it doesn't exist yet
    pub create_if_missing: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            busy_timeout: None,
            acquire_timeout: None,
            max_connections: None,
            create_if_missing: true,
        }
    }
}

/// An object that represents a connection to the bookstore database
#[derive(Clone, Debug)]
pub struct Database(Pool<Sqlite>);

impl From<Pool<Sqlite>> for Database {
    /// **WARNING**: This is primarily intended for tests. You should probably
    /// use [Database::open()] instead of creating the pool yourself, since
    /// [Database::open()] will perform database schema migration automatically.
    fn from(value: Pool<Sqlite>) -> Self {
        Self(value)
    }
}

impl Database {
    /// Open a connection to the specified database with default connection
    /// settings. This will also perform any necessary sql migrations to ensure
    /// that the `books` collection exists.
    pub async fn open<P: AsRef<Path>>(db: P) -> Result<Self> {
        Self::open_with(db, &ConnectOptions::default()).await
    }

    /// Open a connection to the specified database, passing the given settings
    /// through to the engine.
    pub async fn open_with<P: AsRef<Path>>(db: P, options: &ConnectOptions) -> Result<Self> {
        let path = db.as_ref();
        debug!(database = DATABASE_NAME, ?path, ?options, "opening database");
        let mut connect = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(options.create_if_missing);
        if let Some(timeout) = options.busy_timeout {
            connect = connect.busy_timeout(timeout);
        }
        let mut pool = SqlitePoolOptions::new();
        if let Some(timeout) = options.acquire_timeout {
            pool = pool.acquire_timeout(timeout);
        }
        if let Some(max) = options.max_connections {
            pool = pool.max_connections(max);
        }
        let dbpool = pool.connect_with(connect).await?;
        trace!("Running database migrations");
        sqlx::migrate!("../db/migrations").run(&dbpool).await?;
        Ok(Database(dbpool))
    }

    /// gets a reference to the underlying sqlx connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.0
    }

    /// Close all connections to the database
    pub async fn close(&self) {
        self.0.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{book::Book, core::loadable::Loadable};
    use test_log::test;

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_empty_collection(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        assert_eq!(Book::count(None, &db).await.expect("Failed to count"), 0);
    }

    #[test(tokio::test)]
    async fn test_open_creates_collection() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(DEFAULT_DATABASE_FILE);
        assert!(!path.exists());
        let opts = ConnectOptions {
            busy_timeout: Some(Duration::from_millis(500)),
            max_connections: Some(2),
            ..Default::default()
        };
        let db = Database::open_with(&path, &opts)
            .await
            .expect("Failed to open database");
        assert_eq!(Book::count(None, &db).await.expect("Failed to count"), 0);
        db.close().await;
        assert!(path.exists());
    }

    #[test(tokio::test)]
    async fn test_open_missing_without_create() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(DEFAULT_DATABASE_FILE);
        let opts = ConnectOptions {
            create_if_missing: false,
            ..Default::default()
        };
        assert!(Database::open_with(&path, &opts).await.is_err());
        assert!(!path.exists());
    }
}
