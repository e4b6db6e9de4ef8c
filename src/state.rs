use sqlx::SqlitePool;

use crate::{config::AppConfig, db};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config).await?;
        db::migrate(&db).await?;
        Ok(Self::from_parts(db))
    }

    pub fn from_parts(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Fresh, migrated in-memory store.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::init(AppConfig::in_memory()).await
    }
}
