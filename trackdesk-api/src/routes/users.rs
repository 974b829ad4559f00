/// User account endpoints
///
/// Registration is public; every other operation requires an authenticated
/// actor. Accounts are self-service: only the account's owner may modify or
/// delete it.
///
/// # Endpoints
///
/// - `POST /v1/users` - Register (public)
/// - `GET /v1/users` - List users
/// - `GET /v1/users/:id` - Get one user
/// - `PATCH /v1/users/:id` - Update own account
/// - `DELETE /v1/users/:id` - Delete own account
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use validator::Validate;

use trackdesk_shared::auth::password;
use trackdesk_shared::authz::Actor;
use trackdesk_shared::models::user::{
    age_in_years, enforce_consent_floor, CreateUser, UpdateUser, User, MIN_AGE_YEARS,
};

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Unique username
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    /// Unique email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Date of birth
    pub birthdate: NaiveDate,

    /// Consent to being contacted (default true)
    #[serde(default = "default_consent")]
    pub can_be_contacted: bool,

    /// Consent to data sharing (default true)
    #[serde(default = "default_consent")]
    pub can_be_shared: bool,
}

fn default_consent() -> bool {
    true
}

/// Account update request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    /// New date of birth
    pub birthdate: Option<NaiveDate>,

    /// New contact consent value
    pub can_be_contacted: Option<bool>,

    /// New sharing consent value
    pub can_be_shared: Option<bool>,
}

/// Register a new user
///
/// Two age rules apply and both are enforced here. Registration below the
/// minimum age is rejected outright with a field-scoped error on
/// `birthdate`; independently, the consent floor transformation runs before
/// the row is written, so even if the rejection rule were relaxed an
/// under-age row could not carry consent flags.
///
/// # Errors
///
/// - `409 Conflict`: username or email already exists
/// - `422 Unprocessable Entity`: validation failed (including under-age)
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let today = Utc::now().date_naive();
    match age_in_years(req.birthdate, today) {
        Some(age) if age >= MIN_AGE_YEARS => {}
        _ => {
            return Err(ApiError::field_error(
                "birthdate",
                format!("You must be at least {} years old to register", MIN_AGE_YEARS),
            ));
        }
    }

    let mut can_be_contacted = req.can_be_contacted;
    let mut can_be_shared = req.can_be_shared;
    enforce_consent_floor(req.birthdate, today, &mut can_be_contacted, &mut can_be_shared);

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            birthdate: req.birthdate,
            can_be_contacted,
            can_be_shared,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// List users, most recently created first
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<User>>> {
    require_authenticated(&actor)?;

    let users = User::list(&state.db).await?;
    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    require_authenticated(&actor)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {} does not exist", id)))?;

    Ok(Json(user))
}

/// Update own account
///
/// The consent floor runs against the effective birthdate (the new one if
/// the request changes it, the stored one otherwise) before the row is
/// written. Aging past the threshold never flips consent back on.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    require_self(&actor, id)?;
    req.validate()?;

    let current = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {} does not exist", id)))?;

    let birthdate = req.birthdate.unwrap_or(current.birthdate);
    let mut can_be_contacted = req.can_be_contacted.unwrap_or(current.can_be_contacted);
    let mut can_be_shared = req.can_be_shared.unwrap_or(current.can_be_shared);
    enforce_consent_floor(
        birthdate,
        Utc::now().date_naive(),
        &mut can_be_contacted,
        &mut can_be_shared,
    );

    let password_hash = match req.password {
        Some(ref plaintext) => Some(password::hash_password(plaintext)?),
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            email: req.email,
            password_hash,
            birthdate: req.birthdate,
            can_be_contacted: Some(can_be_contacted),
            can_be_shared: Some(can_be_shared),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("user {} does not exist", id)))?;

    Ok(Json(user))
}

/// Delete own account
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_self(&actor, id)?;

    if User::delete(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("user {} does not exist", id)))
    }
}

fn require_authenticated(actor: &Actor) -> Result<i64, ApiError> {
    actor
        .user_id()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
}

fn require_self(actor: &Actor, id: i64) -> Result<(), ApiError> {
    let user_id = require_authenticated(actor)?;

    if user_id != id {
        return Err(ApiError::Forbidden(
            "You can only modify your own account".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_self_rejects_anonymous_and_others() {
        assert!(matches!(
            require_self(&Actor::Anonymous, 1),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            require_self(&Actor::User(2), 1),
            Err(ApiError::Forbidden(_))
        ));
        assert!(require_self(&Actor::User(1), 1).is_ok());
    }

    #[test]
    fn test_create_user_request_defaults_consent() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"username": "alice", "email": "alice@mail.com",
                "password": "longenough", "birthdate": "1990-01-01"}"#,
        )
        .unwrap();

        assert!(req.can_be_contacted);
        assert!(req.can_be_shared);
    }
}
