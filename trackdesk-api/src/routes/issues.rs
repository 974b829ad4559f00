/// Issue endpoints
///
/// Creation resolves the owning project from the payload's `project` field
/// through the authorization engine (membership is checked before the row
/// exists) and validates the assignee against the project's membership.
/// Updates re-validate the assignee whenever it changes, against the
/// issue's current project; the project of an issue is immutable.
///
/// # Endpoints
///
/// - `POST /v1/issues` - Create an issue (any contributor of the project)
/// - `GET /v1/issues` - List issues in the actor's projects
/// - `GET /v1/issues/:id` - Get one issue
/// - `PATCH /v1/issues/:id` - Update (issue author only)
/// - `DELETE /v1/issues/:id` - Delete (issue author only)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use validator::Validate;

use trackdesk_shared::authz::{
    assignment, engine,
    resolver::{ParentRef, Resource},
    Action, Actor, AuthzError,
};
use trackdesk_shared::models::issue::{
    CreateIssue, Issue, IssuePriority, IssueStatus, IssueTag, UpdateIssue,
};

/// Issue creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIssueRequest {
    /// Owning project ID
    pub project: i64,

    /// Assignee user ID
    pub assign_to: i64,

    /// Issue title
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Workflow state (default to-do)
    #[serde(default)]
    pub status: IssueStatus,

    /// Priority (default low)
    #[serde(default)]
    pub priority: IssuePriority,

    /// Category tag (default task)
    #[serde(default)]
    pub tag: IssueTag,
}

/// Issue update request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateIssueRequest {
    /// New assignee
    pub assign_to: Option<i64>,

    /// New title
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
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

/// Create an issue
///
/// # Errors
///
/// - `404 Not Found`: the referenced project does not exist
/// - `403 Forbidden`: actor is not a contributor of the project
/// - `422 Unprocessable Entity`: assignee is not a contributor (field-keyed
///   on `assign_to`)
pub async fn create_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateIssueRequest>,
) -> ApiResult<(StatusCode, Json<Issue>)> {
    let author_id = actor.user_id().ok_or(AuthzError::Unauthenticated)?;
    req.validate()?;

    // Membership check runs against the declared parent; the issue row does
    // not exist yet.
    let project = engine::authorize_create(&state.db, &actor, ParentRef::Project(req.project)).await?;

    assignment::validate_assignee(&state.db, project.id, req.assign_to).await?;

    let issue = Issue::create(
        &state.db,
        CreateIssue {
            project_id: project.id,
            author_id,
            assign_to: req.assign_to,
            name: req.name,
            description: req.description,
            status: req.status,
            priority: req.priority,
            tag: req.tag,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(issue)))
}

/// List issues in projects the actor is a contributor of, newest first
pub async fn list_issues(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<Issue>>> {
    let user_id = actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let issues = Issue::list_for_member(&state.db, user_id).await?;
    Ok(Json(issues))
}

/// Get an issue (contributors of its project only)
pub async fn get_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Issue>> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let issue = load_issue(&state, id).await?;
    engine::authorize(&state.db, &actor, Action::Read, &Resource::Issue(issue.clone())).await?;

    Ok(Json(issue))
}

/// Update an issue (issue author only)
///
/// A change of assignee is re-validated against the issue's current
/// project's membership.
pub async fn update_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateIssueRequest>,
) -> ApiResult<Json<Issue>> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let issue = load_issue(&state, id).await?;
    engine::authorize(&state.db, &actor, Action::Update, &Resource::Issue(issue.clone())).await?;
    req.validate()?;

    if let Some(assign_to) = req.assign_to {
        if assign_to != issue.assign_to {
            assignment::validate_assignee(&state.db, issue.project_id, assign_to).await?;
        }
    }

    let updated = Issue::update(
        &state.db,
        id,
        UpdateIssue {
            assign_to: req.assign_to,
            name: req.name,
            description: req.description,
            status: req.status,
            priority: req.priority,
            tag: req.tag,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("issue {} does not exist", id)))?;

    Ok(Json(updated))
}

/// Delete an issue (issue author only)
pub async fn delete_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let issue = load_issue(&state, id).await?;
    engine::authorize(&state.db, &actor, Action::Delete, &Resource::Issue(issue)).await?;

    Issue::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_issue(state: &AppState, id: i64) -> Result<Issue, ApiError> {
    Issue::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("issue {} does not exist", id)))
}
