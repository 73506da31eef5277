//! SQLite persistence layer: connection pool plus embedded migrations.

use std::time::Duration;

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
};
use tracing::info;

pub mod models;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Shared database handle. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Open the database at `path`, creating it if missing, and bring the
    /// schema up to date.
    pub async fn new(path: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;
        info!(path, "database ready");

        Ok(Self { pool })
    }

    /// In-memory database for tests. Pinned to a single connection so every
    /// handle sees the same data.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }
}
