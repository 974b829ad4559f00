/// Issue model and database operations
///
/// An issue belongs to exactly one project (immutable after creation) and
/// carries an author and an assignee. Assignee validity (must be a project
/// contributor at assignment time) is checked by `authz::assignment` before
/// create and before any update that changes `assign_to`; the model itself
/// only persists.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE issue_status AS ENUM ('to-do', 'in-progress', 'finished');
/// CREATE TYPE issue_priority AS ENUM ('low', 'medium', 'high');
/// CREATE TYPE issue_tag AS ENUM ('bug', 'task', 'feature');
///
/// CREATE TABLE issues (
///     id BIGSERIAL PRIMARY KEY,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     assign_to BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     status issue_status NOT NULL DEFAULT 'to-do',
///     priority issue_priority NOT NULL DEFAULT 'low',
///     tag issue_tag NOT NULL DEFAULT 'task',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Issue workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    /// Not started yet (default)
    ToDo,

    /// Being worked on
    InProgress,

    /// Done
    Finished,
}

/// Issue priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    /// Low priority (default)
    Low,

    /// Medium priority
    Medium,

    /// High priority
    High,
}

/// Issue category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_tag", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssueTag {
    /// Defect
    Bug,

    /// Work item (default)
    Task,

    /// New functionality
    Feature,
}

impl Default for IssueStatus {
    fn default() -> Self {
        IssueStatus::ToDo
    }
}

impl Default for IssuePriority {
    fn default() -> Self {
        IssuePriority::Low
    }
}

impl Default for IssueTag {
    fn default() -> Self {
        IssueTag::Task
    }
}

/// Issue model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Issue {
    /// Unique issue ID
    pub id: i64,

    /// Owning project; immutable after creation
    pub project_id: i64,

    /// Author (creator)
    pub author_id: i64,

    /// Assignee; must be a contributor of the project at assignment time
    pub assign_to: i64,

    /// Issue title
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Workflow state
    pub status: IssueStatus,

    /// Priority
    pub priority: IssuePriority,

    /// Category tag
    pub tag: IssueTag,

    /// When the issue was created
    pub created_at: DateTime<Utc>,

    /// When the issue was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssue {
    /// Owning project ID
    pub project_id: i64,

    /// Author user ID
    pub author_id: i64,

    /// Assignee user ID
    pub assign_to: i64,

    /// Issue title
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Workflow state
    #[serde(default)]
    pub status: IssueStatus,

    /// Priority
    #[serde(default)]
    pub priority: IssuePriority,

    /// Category tag
    #[serde(default)]
    pub tag: IssueTag,
}

/// Input for updating an existing issue
///
/// Project and author are immutable; all other fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIssue {
    /// New assignee
    pub assign_to: Option<i64>,

    /// New title
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New workflow state
    pub status: Option<IssueStatus>,

    /// New priority
    pub priority: Option<IssuePriority>,

    /// New category tag
    pub tag: Option<IssueTag>,
}

impl Issue {
    /// Creates a new issue
    pub async fn create(pool: &PgPool, data: CreateIssue) -> Result<Self, sqlx::Error> {
        let issue = sqlx::query_as::<_, Issue>(
            r#"
            INSERT INTO issues (project_id, author_id, assign_to, name,
                                description, status, priority, tag)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, project_id, author_id, assign_to, name, description,
                      status, priority, tag, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.author_id)
        .bind(data.assign_to)
        .bind(data.name)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.tag)
        .fetch_one(pool)
        .await?;

        Ok(issue)
    }

    /// Finds an issue by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let issue = sqlx::query_as::<_, Issue>(
            r#"
            SELECT id, project_id, author_id, assign_to, name, description,
                   status, priority, tag, created_at, updated_at
            FROM issues
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(issue)
    }

    /// Lists issues in projects the user is a contributor of, newest first
    pub async fn list_for_member(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let issues = sqlx::query_as::<_, Issue>(
            r#"
            SELECT i.id, i.project_id, i.author_id, i.assign_to, i.name,
                   i.description, i.status, i.priority, i.tag,
                   i.created_at, i.updated_at
            FROM issues i
            JOIN contributors c ON c.project_id = i.project_id
            WHERE c.user_id = $1
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(issues)
    }

    /// Updates an issue, writing only the fields set in `data`
    ///
    /// `project_id` and `author_id` never change. Returns the updated issue,
    /// or `None` if no issue has this ID.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateIssue,
    ) -> Result<Option<Self>, sqlx::Error> {
        let issue = sqlx::query_as::<_, Issue>(
            r#"
            UPDATE issues
            SET assign_to = COALESCE($2, assign_to),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                tag = COALESCE($7, tag),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, author_id, assign_to, name, description,
                      status, priority, tag, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.assign_to)
        .bind(data.name)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.tag)
        .fetch_optional(pool)
        .await?;

        Ok(issue)
    }

    /// Deletes an issue (comments removed by cascade)
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
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
    fn test_issue_enum_defaults() {
        assert_eq!(IssueStatus::default(), IssueStatus::ToDo);
        assert_eq!(IssuePriority::default(), IssuePriority::Low);
        assert_eq!(IssueTag::default(), IssueTag::Task);
    }

    #[test]
    fn test_issue_status_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&IssueStatus::ToDo).unwrap(),
            "\"to-do\""
        );
        assert_eq!(
            serde_json::to_string(&IssueStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        let status: IssueStatus = serde_json::from_str("\"finished\"").unwrap();
        assert_eq!(status, IssueStatus::Finished);
    }

    #[test]
    fn test_create_issue_deserializes_with_defaults() {
        let data: CreateIssue = serde_json::from_str(
            r#"{"project_id": 1, "author_id": 2, "assign_to": 2, "name": "Bug1"}"#,
        )
        .unwrap();

        assert_eq!(data.status, IssueStatus::ToDo);
        assert_eq!(data.priority, IssuePriority::Low);
        assert_eq!(data.tag, IssueTag::Task);
    }

    // Integration tests for database operations are in tests/
}
