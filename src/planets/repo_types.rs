use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::planets::dto::Terrain;

/// Planet record in the database, serialized as-is in responses.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Planet {
    pub id: i64,
    pub name: String,
    pub seed: String,
    pub terrain: String,
    pub atmosphere_color: String,
    pub liquid_percent: i64,
    pub liquid_color: String,
    pub land_color: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlanet {
    pub name: String,
    pub seed: String,
    pub terrain: Terrain,
    pub atmosphere_color: String,
    pub liquid_percent: i64,
    pub liquid_color: String,
    pub land_color: String,
}
