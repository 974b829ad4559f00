/// Contributor model: the membership registry
///
/// A contributor row associates a user with a project and is what grants
/// read/create access to the project's issues and comments. The composite
/// primary key enforces pair uniqueness at the storage layer, closing the
/// race between two concurrent add calls for the same (project, user).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contributors (
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use trackdesk_shared::models::contributor::Contributor;
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool, project_id: i64, user_id: i64) -> anyhow::Result<()> {
/// let contributor = Contributor::add(&pool, project_id, user_id).await?;
///
/// assert!(Contributor::is_member(&pool, project_id, user_id).await?);
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

/// Error type for membership registry operations
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    /// The (project, user) pair already exists
    ///
    /// Surfaced as a conflict to the caller, never silently deduplicated.
    #[error("user {user_id} is already a contributor of project {project_id}")]
    DuplicateMembership { project_id: i64, user_id: i64 },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Contributor model representing a user-project membership
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contributor {
    /// Project ID
    pub project_id: i64,

    /// User ID
    pub user_id: i64,

    /// When the user joined the project
    pub created_at: DateTime<Utc>,
}

impl Contributor {
    /// Adds a user to a project
    ///
    /// Takes any executor so project creation can enroll its author inside
    /// the same transaction as the project insert.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::DuplicateMembership` if the pair already
    /// exists; the unique-violation detection relies on the composite
    /// primary key, so the check holds under concurrency.
    pub async fn add<'e, E>(
        executor: E,
        project_id: i64,
        user_id: i64,
    ) -> Result<Self, MembershipError>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query_as::<_, Contributor>(
            r#"
            INSERT INTO contributors (project_id, user_id)
            VALUES ($1, $2)
            RETURNING project_id, user_id, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await;

        match result {
            Ok(contributor) => Ok(contributor),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(MembershipError::DuplicateMembership {
                    project_id,
                    user_id,
                })
            }
            Err(e) => Err(MembershipError::Database(e)),
        }
    }

    /// Checks whether a user is a contributor of a project
    pub async fn is_member(
        pool: &PgPool,
        project_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM contributors
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists a project's contributors, most recently joined first
    ///
    /// The ordering is for presentation only and carries no semantic weight.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let contributors = sqlx::query_as::<_, Contributor>(
            r#"
            SELECT project_id, user_id, created_at
            FROM contributors
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(contributors)
    }

    /// Removes a user from a project
    ///
    /// Returns `true` if a row was deleted.
    pub async fn remove(
        pool: &PgPool,
        project_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM contributors WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts a project's contributors
    pub async fn count_by_project(pool: &PgPool, project_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contributors WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_membership_display() {
        let err = MembershipError::DuplicateMembership {
            project_id: 7,
            user_id: 3,
        };
        assert_eq!(
            err.to_string(),
            "user 3 is already a contributor of project 7"
        );
    }

    // Integration tests for database operations are in tests/
}
