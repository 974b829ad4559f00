/// Project model and database operations
///
/// A project owns issues (and transitively comments) and carries exactly one
/// author. Creation enrolls the author as the project's first contributor in
/// the same transaction as the project insert, so a crash between the two
/// writes can never leave an author without membership. Enrollment happens
/// only on first insert; later updates never re-trigger it.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_kind AS ENUM ('backend', 'frontend', 'ios', 'android');
///
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL UNIQUE,
///     description TEXT,
///     kind project_kind NOT NULL,
///     author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use trackdesk_shared::models::project::{CreateProject, Project, ProjectKind};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool, author_id: i64) -> anyhow::Result<()> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Alpha".to_string(),
///     description: None,
///     kind: ProjectKind::Backend,
///     author_id,
/// }).await?;
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::contributor::{Contributor, MembershipError};

/// Platform a project targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    /// Back-end service
    Backend,

    /// Front-end application
    Frontend,

    /// iOS application
    Ios,

    /// Android application
    Android,
}

impl ProjectKind {
    /// Converts kind to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Backend => "backend",
            ProjectKind::Frontend => "frontend",
            ProjectKind::Ios => "ios",
            ProjectKind::Android => "android",
        }
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: i64,

    /// Unique project name
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Platform kind
    pub kind: ProjectKind,

    /// Author (creator); always a contributor by construction
    pub author_id: i64,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Unique project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Platform kind
    pub kind: ProjectKind,

    /// Author user ID
    pub author_id: i64,
}

/// Input for updating an existing project
///
/// The author is immutable; only content fields can change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New project name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New platform kind
    pub kind: Option<ProjectKind>,
}

impl Project {
    /// Creates a new project and enrolls its author as first contributor
    ///
    /// Both inserts run in a single transaction. The enrollment is performed
    /// exactly once, here; `update` never touches the contributor table.
    ///
    /// # Errors
    ///
    /// Returns a database error if the name is taken or the author does not
    /// exist. A `DuplicateMembership` cannot occur for a freshly inserted
    /// project but is propagated if it ever does.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, MembershipError> {
        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, kind, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, kind, author_id, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.kind)
        .bind(data.author_id)
        .fetch_one(&mut *tx)
        .await?;

        Contributor::add(&mut *tx, project.id, project.author_id).await?;

        tx.commit().await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, kind, author_id, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists the projects a user is a contributor of, newest first
    pub async fn list_for_member(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.kind, p.author_id,
                   p.created_at, p.updated_at
            FROM projects p
            JOIN contributors c ON c.project_id = p.id
            WHERE c.user_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project, writing only the fields set in `data`
    ///
    /// Returns the updated project, or `None` if no project has this ID.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                kind = COALESCE($4, kind),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, kind, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.kind)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project
    ///
    /// Contributor rows, issues, and comments are removed by cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_kind_as_str() {
        assert_eq!(ProjectKind::Backend.as_str(), "backend");
        assert_eq!(ProjectKind::Frontend.as_str(), "frontend");
        assert_eq!(ProjectKind::Ios.as_str(), "ios");
        assert_eq!(ProjectKind::Android.as_str(), "android");
    }

    #[test]
    fn test_project_kind_serde_round_trip() {
        let json = serde_json::to_string(&ProjectKind::Ios).unwrap();
        assert_eq!(json, "\"ios\"");
        let kind: ProjectKind = serde_json::from_str("\"android\"").unwrap();
        assert_eq!(kind, ProjectKind::Android);
    }

    // Integration tests for database operations are in tests/
}
