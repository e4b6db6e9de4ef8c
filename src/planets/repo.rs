use sqlx::SqlitePool;

use crate::planets::repo_types::{NewPlanet, Planet};

const PLANET_COLUMNS: &str = "id, name, seed, terrain, atmosphere_color, liquid_percent, \
                              liquid_color, land_color, created_at";

impl Planet {
    /// Newest first; rows created within the same millisecond fall back to id.
    pub async fn list(db: &SqlitePool) -> anyhow::Result<Vec<Planet>> {
        let planets = sqlx::query_as::<_, Planet>(&format!(
            "SELECT {PLANET_COLUMNS} FROM planets ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(db)
        .await?;
        Ok(planets)
    }

    pub async fn seed_taken(db: &SqlitePool, seed: &str) -> anyhow::Result<bool> {
        let taken: i64 =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM planets WHERE seed = ?)")
                .bind(seed)
                .fetch_one(db)
                .await?;
        Ok(taken != 0)
    }

    pub async fn create(db: &SqlitePool, new: &NewPlanet) -> anyhow::Result<Planet> {
        let planet = sqlx::query_as::<_, Planet>(&format!(
            r#"
            INSERT INTO planets
                (name, seed, terrain, atmosphere_color, liquid_percent, liquid_color, land_color)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {PLANET_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.seed)
        .bind(new.terrain.as_str())
        .bind(&new.atmosphere_color)
        .bind(new.liquid_percent)
        .bind(&new.liquid_color)
        .bind(&new.land_color)
        .fetch_one(db)
        .await?;
        Ok(planet)
    }

    pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM planets")
            .fetch_one(db)
            .await?;
        Ok(count)
    }
}
