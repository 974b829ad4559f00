/// Project endpoints
///
/// Any authenticated user may create a project (becoming its author and
/// first contributor in one transaction). Everything else goes through the
/// authorization engine: membership for read, membership + authorship for
/// update and delete.
///
/// # Endpoints
///
/// - `POST /v1/projects` - Create a project
/// - `GET /v1/projects` - List the actor's projects
/// - `GET /v1/projects/:id` - Get one project
/// - `PATCH /v1/projects/:id` - Update (author only)
/// - `DELETE /v1/projects/:id` - Delete (author only)
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

use trackdesk_shared::authz::{engine, resolver::Resource, Action, Actor, AuthzError};
use trackdesk_shared::models::project::{CreateProject, Project, ProjectKind, UpdateProject};

/// Project creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Unique project name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Platform kind
    pub kind: ProjectKind,
}

/// Project update request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New project name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New platform kind
    pub kind: Option<ProjectKind>,
}

/// Create a project
///
/// The acting user becomes the author; author enrollment as first
/// contributor happens inside the same transaction as the insert.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let author_id = actor.user_id().ok_or(AuthzError::Unauthenticated)?;
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            kind: req.kind,
            author_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// List the projects the actor is a contributor of, newest first
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<Project>>> {
    let user_id = actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let projects = Project::list_for_member(&state.db, user_id).await?;
    Ok(Json(projects))
}

/// Get a project (contributors only)
pub async fn get_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Project>> {
    // Unauthenticated is checked before the load so an anonymous request
    // cannot even probe which ids exist.
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let project = load_project(&state, id).await?;
    engine::authorize(&state.db, &actor, Action::Read, &Resource::Project(project.clone())).await?;

    Ok(Json(project))
}

/// Update a project (author only)
pub async fn update_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let project = load_project(&state, id).await?;
    engine::authorize(&state.db, &actor, Action::Update, &Resource::Project(project)).await?;
    req.validate()?;

    let updated = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
            kind: req.kind,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("project {} does not exist", id)))?;

    Ok(Json(updated))
}

/// Delete a project (author only)
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let project = load_project(&state, id).await?;
    engine::authorize(&state.db, &actor, Action::Delete, &Resource::Project(project)).await?;

    Project::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_project(state: &AppState, id: i64) -> Result<Project, ApiError> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {} does not exist", id)))
}
