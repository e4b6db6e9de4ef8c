use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    db::is_unique_violation,
    error::ApiError,
    planets::{dto::CreatePlanetRequest, repo_types::Planet},
    validation::FieldErrors,
};

const SEED_TAKEN: &str = "planet with this seed already exists.";

fn seed_taken() -> ApiError {
    ApiError::Validation(FieldErrors::single("seed", SEED_TAKEN))
}

pub async fn create(db: &SqlitePool, request: CreatePlanetRequest) -> Result<Planet, ApiError> {
    let new = request.planet;
    if Planet::seed_taken(db, &new.seed).await? {
        warn!(seed = %new.seed, "planet seed already used");
        return Err(seed_taken());
    }

    let planet = Planet::create(db, &new).await.map_err(|e| {
        if is_unique_violation(&e) {
            warn!(seed = %new.seed, "planet seed claimed concurrently");
            seed_taken()
        } else {
            ApiError::Internal(e)
        }
    })?;

    info!(planet_id = planet.id, seed = %planet.seed, terrain = %planet.terrain, "planet created");
    Ok(planet)
}
