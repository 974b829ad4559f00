/// Comment endpoints
///
/// Creation resolves the owning project from the payload's `issue` field
/// (issue → project, one extra hop) through the authorization engine.
/// Mutation is restricted to the comment's author.
///
/// # Endpoints
///
/// - `POST /v1/comments` - Create a comment (any contributor of the project)
/// - `GET /v1/comments` - List comments in the actor's projects
/// - `GET /v1/comments/:id` - Get one comment
/// - `PATCH /v1/comments/:id` - Update (comment author only)
/// - `DELETE /v1/comments/:id` - Delete (comment author only)
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
    engine,
    resolver::{ParentRef, Resource},
    Action, Actor, AuthzError,
};
use trackdesk_shared::models::comment::{Comment, CreateComment};

/// Comment creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Owning issue ID
    pub issue: i64,

    /// Free-text content
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
}

/// Comment update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    /// New content
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
}

/// Create a comment
///
/// # Errors
///
/// - `404 Not Found`: the referenced issue does not exist
/// - `403 Forbidden`: actor is not a contributor of the issue's project
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let author_id = actor.user_id().ok_or(AuthzError::Unauthenticated)?;
    req.validate()?;

    engine::authorize_create(&state.db, &actor, ParentRef::Issue(req.issue)).await?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            issue_id: req.issue,
            author_id,
            description: req.description,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// List comments in projects the actor is a contributor of, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<Comment>>> {
    let user_id = actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let comments = Comment::list_for_member(&state.db, user_id).await?;
    Ok(Json(comments))
}

/// Get a comment (contributors of its project only)
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Comment>> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let comment = load_comment(&state, id).await?;
    engine::authorize(&state.db, &actor, Action::Read, &Resource::Comment(comment.clone()))
        .await?;

    Ok(Json(comment))
}

/// Update a comment (comment author only)
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let comment = load_comment(&state, id).await?;
    engine::authorize(&state.db, &actor, Action::Update, &Resource::Comment(comment))
        .await?;
    req.validate()?;

    let updated = Comment::update(&state.db, id, req.description)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("comment {} does not exist", id)))?;

    Ok(Json(updated))
}

/// Delete a comment (comment author only)
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)?;

    let comment = load_comment(&state, id).await?;
    engine::authorize(&state.db, &actor, Action::Delete, &Resource::Comment(comment)).await?;

    Comment::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_comment(state: &AppState, id: i64) -> Result<Comment, ApiError> {
    Comment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("comment {} does not exist", id)))
}
