use anyhow::Context;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::config::AppConfig;

/// SQLite extended result code for `SQLITE_CONSTRAINT_UNIQUE`.
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";

pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let db = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;
    Ok(db)
}

pub async fn migrate(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run database migrations")?;
    Ok(())
}

/// True when `err` wraps a database error raised by a `UNIQUE` constraint.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err
            .code()
            .map(|code| code == SQLITE_CONSTRAINT_UNIQUE)
            .unwrap_or(false),
        _ => false,
    }
}
