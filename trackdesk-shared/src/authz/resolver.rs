/// Resource graph resolver
///
/// Maps any resource instance, or a to-be-created resource's declared parent
/// reference, to its owning project:
///
/// - project → itself
/// - issue → its project
/// - comment → its issue's project (one extra hop)
///
/// The traversal takes an explicit store handle so its failure mode (a
/// missing parent) is explicit and testable, rather than hiding behind lazy
/// relationship loading.
use sqlx::PgPool;

use super::AuthzError;
use crate::models::{comment::Comment, issue::Issue, project::Project};

/// The closed set of resource kinds the permission model covers
///
/// Dispatch over this enum is always an exhaustive `match`: adding a fourth
/// kind is a compile error at every decision point, so no resource can ever
/// be silently permitted by a forgotten branch.
#[derive(Debug, Clone)]
pub enum Resource {
    /// A project (resolves to itself)
    Project(Project),

    /// An issue (resolves via its project reference)
    Issue(Issue),

    /// A comment (resolves via its issue's project reference)
    Comment(Comment),
}

impl Resource {
    /// Returns the author of the resource, used by the authorship policy
    pub fn author_id(&self) -> i64 {
        match self {
            Resource::Project(p) => p.author_id,
            Resource::Issue(i) => i.author_id,
            Resource::Comment(c) => c.author_id,
        }
    }

    /// Resource kind name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Project(_) => "project",
            Resource::Issue(_) => "issue",
            Resource::Comment(_) => "comment",
        }
    }
}

/// Declared parent reference of a not-yet-created resource
///
/// Authorization for create runs before the new row exists, so the engine
/// resolves the owning project from the creation payload instead: an issue
/// payload names a project, a comment payload names an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    /// Issue creation: the payload's `project` id
    Project(i64),

    /// Comment creation: the payload's `issue` id
    Issue(i64),
}

/// Resolves the owning project of an existing resource
///
/// # Errors
///
/// Returns `UnresolvableParent` if an ancestor row has disappeared since the
/// resource was loaded (deleted concurrently).
pub async fn resolve_project(pool: &PgPool, resource: &Resource) -> Result<Project, AuthzError> {
    match resource {
        Resource::Project(project) => Ok(project.clone()),
        Resource::Issue(issue) => load_project(pool, issue.project_id).await,
        Resource::Comment(comment) => {
            let issue = load_issue(pool, comment.issue_id).await?;
            load_project(pool, issue.project_id).await
        }
    }
}

/// Resolves the owning project from a creation payload's parent reference
///
/// # Errors
///
/// Returns `UnresolvableParent` if the referenced id does not exist. The
/// calling layer surfaces this as not-found, never as a permission failure.
pub async fn resolve_parent(pool: &PgPool, parent: ParentRef) -> Result<Project, AuthzError> {
    match parent {
        ParentRef::Project(project_id) => load_project(pool, project_id).await,
        ParentRef::Issue(issue_id) => {
            let issue = load_issue(pool, issue_id).await?;
            load_project(pool, issue.project_id).await
        }
    }
}

async fn load_project(pool: &PgPool, project_id: i64) -> Result<Project, AuthzError> {
    Project::find_by_id(pool, project_id)
        .await?
        .ok_or(AuthzError::UnresolvableParent {
            kind: "project",
            id: project_id,
        })
}

async fn load_issue(pool: &PgPool, issue_id: i64) -> Result<Issue, AuthzError> {
    Issue::find_by_id(pool, issue_id)
        .await?
        .ok_or(AuthzError::UnresolvableParent {
            kind: "issue",
            id: issue_id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_project(author_id: i64) -> Project {
        Project {
            id: 1,
            name: "Alpha".to_string(),
            description: None,
            kind: crate::models::project::ProjectKind::Backend,
            author_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_author_id_covers_every_kind() {
        let project = sample_project(10);

        let issue = Issue {
            id: 2,
            project_id: 1,
            author_id: 20,
            assign_to: 10,
            name: "Bug1".to_string(),
            description: None,
            status: Default::default(),
            priority: Default::default(),
            tag: Default::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let comment = Comment {
            id: 3,
            uuid: Uuid::new_v4(),
            issue_id: 2,
            author_id: 30,
            description: "looks wrong".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(Resource::Project(project).author_id(), 10);
        assert_eq!(Resource::Issue(issue).author_id(), 20);
        assert_eq!(Resource::Comment(comment).author_id(), 30);
    }

    #[test]
    fn test_resource_kind_names() {
        let project = sample_project(1);
        assert_eq!(Resource::Project(project).kind(), "project");
    }

    // resolve_project / resolve_parent are exercised against a live database
    // in tests/
}
