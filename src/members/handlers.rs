use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::ApiError,
    members::{
        dto::{MessageResponse, PublicMember, SignupRequest, UpdateMemberRequest},
        repo_types::Member,
        services,
    },
    state::AppState,
    validation::{parse_object, JsonObject},
};

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/members/", get(list_members).post(create_member))
        .route("/members/signup/", post(signup))
        .route(
            "/members/:id/",
            get(get_member).put(update_member).delete(delete_member),
        )
}

/// Only plain decimal ids can name a member; `+1` or `-1` never do.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::user_not_found());
    }
    raw.parse().map_err(|_| ApiError::user_not_found())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let request = SignupRequest::from_payload(&payload)?;
    services::register(&state.db, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_members(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicMember>>, ApiError> {
    let members = Member::list(&state.db).await?;
    Ok(Json(members.into_iter().map(PublicMember::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_member(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject,
) -> Result<(StatusCode, Json<PublicMember>), ApiError> {
    let request = SignupRequest::from_payload(&payload)?;
    let member = services::register(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

#[instrument(skip(state))]
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicMember>, ApiError> {
    let member = services::find(&state.db, parse_id(&id)?).await?;
    Ok(Json(member.into()))
}

#[instrument(skip(state, body))]
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<PublicMember>, ApiError> {
    let id = parse_id(&id)?;
    // The body is only parsed once the member is known to exist.
    services::find(&state.db, id).await?;
    let payload = parse_object(&body)?;
    let request = UpdateMemberRequest::from_payload(&payload)?;
    let member = services::update(&state.db, id, request).await?;
    Ok(Json(member.into()))
}

#[instrument(skip(state))]
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    services::delete(&state.db, parse_id(&id)?).await?;
    Ok((
        StatusCode::NO_CONTENT,
        Json(MessageResponse {
            message: "User deleted successfully",
        }),
    ))
}
