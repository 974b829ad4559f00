/// Contributor (membership) endpoints
///
/// Adding or removing a contributor mutates the project's membership, so
/// both run through the authorization engine as an update on the project:
/// the actor must be a contributor AND the project's author. Listing only
/// requires membership.
///
/// # Endpoints
///
/// - `POST /v1/contributors` - Add a user to a project (project author only)
/// - `GET /v1/contributors?project=` - List a project's contributors
/// - `DELETE /v1/contributors/:project_id/:user_id` - Remove a contributor
///   (project author only)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use trackdesk_shared::authz::{engine, resolver::Resource, Action, Actor, AuthzError};
use trackdesk_shared::models::contributor::Contributor;
use trackdesk_shared::models::project::Project;
use trackdesk_shared::models::user::User;

/// Add-contributor request
#[derive(Debug, Deserialize)]
pub struct AddContributorRequest {
    /// Project to add the user to
    pub project: i64,

    /// User being added
    pub user: i64,
}

/// Query parameters for listing contributors
#[derive(Debug, Deserialize)]
pub struct ListContributorsQuery {
    /// Project to list
    pub project: i64,
}

/// Add a contributor to a project
///
/// # Errors
///
/// - `404 Not Found`: the project or the user does not exist
/// - `403 Forbidden`: actor is not the project's author
/// - `409 Conflict`: the pair already exists (duplicate membership is a
///   hard error, never silently deduplicated)
pub async fn add_contributor(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<AddContributorRequest>,
) -> ApiResult<(StatusCode, Json<Contributor>)> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let project = load_project(&state, req.project).await?;
    engine::authorize(&state.db, &actor, Action::Update, &Resource::Project(project)).await?;

    if User::find_by_id(&state.db, req.user).await?.is_none() {
        return Err(ApiError::NotFound(format!("user {} does not exist", req.user)));
    }

    let contributor = Contributor::add(&state.db, req.project, req.user).await?;

    Ok((StatusCode::CREATED, Json(contributor)))
}

/// List a project's contributors, most recently joined first
pub async fn list_contributors(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListContributorsQuery>,
) -> ApiResult<Json<Vec<Contributor>>> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let project = load_project(&state, query.project).await?;
    engine::authorize(&state.db, &actor, Action::Read, &Resource::Project(project)).await?;

    let contributors = Contributor::list_by_project(&state.db, query.project).await?;
    Ok(Json(contributors))
}

/// Remove a contributor from a project (project author only)
pub async fn remove_contributor(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((project_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let project = load_project(&state, project_id).await?;
    engine::authorize(&state.db, &actor, Action::Update, &Resource::Project(project)).await?;

    if Contributor::remove(&state.db, project_id, user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "user {} is not a contributor of project {}",
            user_id, project_id
        )))
    }
}

async fn load_project(state: &AppState, id: i64) -> Result<Project, ApiError> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {} does not exist", id)))
}
