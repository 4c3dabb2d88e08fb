//! SQLite storage for users and the emails sent on their behalf.

pub mod emails;
pub mod pool;
pub mod users;

use std::path::Path;

use thiserror::Error;
use tracing::info;

pub use pool::DbPool;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Create the database file and its directory if needed, then migrate it
pub async fn initialize(db_path: &Path) -> Result<DbPool, DbError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::Migration(format!("Failed to create database directory: {e}"))
            })?;
        }
    }

    let pool = pool::create_pool(db_path).await?;
    run_migrations(&pool).await?;
    info!(path = %db_path.display(), "database ready");

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    let applied: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM _migrations WHERE name = '0001_initial_schema'")
            .fetch_optional(&mut *conn)
            .await?;

    if applied.is_none() {
        sqlx::raw_sql(include_str!("migrations/0001_initial_schema.sql"))
            .execute(&mut *conn)
            .await?;
        sqlx::query("INSERT INTO _migrations (name) VALUES ('0001_initial_schema')")
            .execute(&mut *conn)
            .await?;
        info!("applied migration 0001_initial_schema");
    }

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> (assert_fs::TempDir, DbPool) {
    let dir = assert_fs::TempDir::new().unwrap();
    let pool = initialize(&dir.path().join("data/test.db")).await.unwrap();
    (dir, pool)
}
