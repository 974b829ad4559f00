/// Comment model and database operations
///
/// A comment belongs to exactly one issue. Besides the numeric primary key
/// it carries a globally unique `uuid` so external systems can reference a
/// comment idempotently without depending on row numbering.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id BIGSERIAL PRIMARY KEY,
///     uuid UUID NOT NULL UNIQUE,
///     issue_id BIGINT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
///     author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     description TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: i64,

    /// Opaque external identifier, independent of the numeric key
    pub uuid: Uuid,

    /// Owning issue
    pub issue_id: i64,

    /// Author (creator)
    pub author_id: i64,

    /// Free-text content
    pub description: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// When the comment was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// Owning issue ID
    pub issue_id: i64,

    /// Author user ID
    pub author_id: i64,

    /// Free-text content
    pub description: String,
}

impl Comment {
    /// Creates a new comment with a freshly generated external UUID
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (uuid, issue_id, author_id, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, uuid, issue_id, author_id, description,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.issue_id)
        .bind(data.author_id)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, uuid, issue_id, author_id, description,
                   created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists comments on issues in projects the user is a contributor of,
    /// newest first
    pub async fn list_for_member(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT cm.id, cm.uuid, cm.issue_id, cm.author_id, cm.description,
                   cm.created_at, cm.updated_at
            FROM comments cm
            JOIN issues i ON i.id = cm.issue_id
            JOIN contributors c ON c.project_id = i.project_id
            WHERE c.user_id = $1
            ORDER BY cm.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Updates a comment's content
    ///
    /// Returns the updated comment, or `None` if no comment has this ID.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        description: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET description = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, uuid, issue_id, author_id, description,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(description)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Deletes a comment
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
