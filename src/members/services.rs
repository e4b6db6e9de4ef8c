use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    db::is_unique_violation,
    error::ApiError,
    members::{
        dto::{SignupRequest, UpdateMemberRequest},
        password::hash_password,
        repo_types::{Member, NewMember},
    },
    validation::FieldErrors,
};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

fn username_taken() -> ApiError {
    ApiError::Validation(FieldErrors::single("username", USERNAME_TAKEN))
}

/// Validates uniqueness and the password confirmation, then stores the
/// member with a hashed password.
pub async fn register(db: &SqlitePool, request: SignupRequest) -> Result<Member, ApiError> {
    if Member::username_taken(db, &request.username, None).await? {
        warn!(username = %request.username, "username already registered");
        return Err(username_taken());
    }

    if let Err(errors) = request.ensure_passwords_match() {
        warn!(username = %request.username, "password confirmation mismatch");
        return Err(errors.into());
    }

    let new = NewMember {
        password_hash: hash_password(&request.password)?,
        username: request.username,
        email: request.email,
    };

    let member = Member::create(db, &new).await.map_err(|e| {
        if is_unique_violation(&e) {
            warn!(username = %new.username, "username claimed concurrently");
            username_taken()
        } else {
            ApiError::Internal(e)
        }
    })?;

    info!(member_id = member.id, username = %member.username, "member registered");
    Ok(member)
}

pub async fn find(db: &SqlitePool, id: i64) -> Result<Member, ApiError> {
    Member::find_by_id(db, id)
        .await?
        .ok_or_else(ApiError::user_not_found)
}

pub async fn update(
    db: &SqlitePool,
    id: i64,
    request: UpdateMemberRequest,
) -> Result<Member, ApiError> {
    let changes = request.changes;
    if let Some(username) = changes.username.as_deref() {
        if Member::username_taken(db, username, Some(id)).await? {
            warn!(member_id = id, username, "username already registered");
            return Err(username_taken());
        }
    }

    let member = Member::update(db, id, &changes)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                username_taken()
            } else {
                ApiError::Internal(e)
            }
        })?
        .ok_or_else(ApiError::user_not_found)?;

    info!(member_id = member.id, "member updated");
    Ok(member)
}

pub async fn delete(db: &SqlitePool, id: i64) -> Result<(), ApiError> {
    if !Member::delete(db, id).await? {
        return Err(ApiError::user_not_found());
    }
    info!(member_id = id, "member deleted");
    Ok(())
}
