use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    error::ApiError,
    planets::{dto::CreatePlanetRequest, repo_types::Planet, services},
    state::AppState,
    validation::JsonObject,
};

pub fn planet_routes() -> Router<AppState> {
    Router::new().route("/planets/", get(list_planets).post(create_planet))
}

#[instrument(skip(state))]
pub async fn list_planets(State(state): State<AppState>) -> Result<Json<Vec<Planet>>, ApiError> {
    let planets = Planet::list(&state.db).await?;
    Ok(Json(planets))
}

#[instrument(skip(state, payload))]
pub async fn create_planet(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject,
) -> Result<(StatusCode, Json<Planet>), ApiError> {
    let request = CreatePlanetRequest::from_payload(&payload)?;
    let planet = services::create(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(planet)))
}
