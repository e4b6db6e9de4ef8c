use sqlx::SqlitePool;

use crate::members::repo_types::{Member, MemberChanges, NewMember};

const MEMBER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, date_joined";

impl Member {
    pub async fn list(db: &SqlitePool) -> anyhow::Result<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY id"
        ))
        .fetch_all(db)
        .await?;
        Ok(members)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(member)
    }

    /// True if another member (other than `except_id`) already uses `username`.
    pub async fn username_taken(
        db: &SqlitePool,
        username: &str,
        except_id: Option<i64>,
    ) -> anyhow::Result<bool> {
        let taken: i64 = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM members
                WHERE username = ? AND (? IS NULL OR id <> ?)
            )
            "#,
        )
        .bind(username)
        .bind(except_id)
        .bind(except_id)
        .fetch_one(db)
        .await?;
        Ok(taken != 0)
    }

    pub async fn create(db: &SqlitePool, new: &NewMember) -> anyhow::Result<Member> {
        let member = sqlx::query_as::<_, Member>(&format!(
            r#"
            INSERT INTO members (username, email, password_hash)
            VALUES (?, ?, ?)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(db)
        .await?;
        Ok(member)
    }

    /// Applies `changes`; `None` if no member has `id`.
    pub async fn update(
        db: &SqlitePool,
        id: i64,
        changes: &MemberChanges,
    ) -> anyhow::Result<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE members
            SET username   = COALESCE(?, username),
                email      = COALESCE(?, email),
                first_name = COALESCE(?, first_name),
                last_name  = COALESCE(?, last_name)
            WHERE id = ?
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(member)
    }

    /// Returns false when nothing was deleted.
    pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(db)
            .await?;
        Ok(count)
    }
}
