//! Repository layer for database operations
//!
//! Functions in [`authors`] and [`books`] take an explicit connection, so the
//! caller decides whether they run inside a transaction.

pub mod authors;
pub mod books;

use std::{path::Path, str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite, SqliteConnection, Transaction,
};

use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
};

/// How long a writer waits for another writer's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a connection pool to the SQLite store
pub async fn connect(config: &DatabaseConfig) -> AppResult<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(config.create_if_missing)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    if config.create_if_missing {
        let filename = options.clone().get_filename();
        if let Some(dir) = filename.parent() {
            create_parent_dir(dir)?;
        }
    }

    // An in-memory database lives only as long as its connection
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    Ok(pool)
}

fn create_parent_dir(dir: &Path) -> AppResult<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::Internal(format!(
            "Cannot create database directory {}: {}",
            dir.display(),
            e
        ))
    })
}

/// Apply the embedded schema migrations
pub async fn migrate(pool: &Pool<Sqlite>) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Start a transaction; it rolls back unless committed
    pub async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Round-trip to the store
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Number of (authors, books) in the store
pub async fn count_rows(conn: &mut SqliteConnection) -> AppResult<(i64, i64)> {
    let authors = authors::count(&mut *conn).await?;
    let books = books::count(&mut *conn).await?;
    Ok((authors, books))
}

#[cfg(test)]
pub(crate) async fn test_pool() -> Pool<Sqlite> {
    let pool = connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    migrate(&pool).await.expect("Failed to run migrations");
    pool
}

/// A migrated pool over a database file, for tests that need several
/// connections writing at once
#[cfg(test)]
pub(crate) async fn test_file_pool(path: &Path) -> Pool<Sqlite> {
    let config = DatabaseConfig {
        url: format!("sqlite://{}", path.display()),
        max_connections: 5,
        create_if_missing: true,
    };
    let pool = connect(&config).await.expect("Failed to open database file");
    migrate(&pool).await.expect("Failed to run migrations");
    pool
}
