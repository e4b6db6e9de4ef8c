use sqlx::FromRow;
use time::OffsetDateTime;

/// Member record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string, never serialized
    pub first_name: String,
    pub last_name: String,
    pub date_joined: OffsetDateTime,
}

/// Columns supplied on insert; the rest are defaulted by the table.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Columns an update may touch. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
