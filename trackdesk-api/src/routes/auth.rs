/// Token endpoints
///
/// Credential verification lives entirely in this thin layer; by the time a
/// request reaches the authorization core it has been reduced to an actor.
///
/// # Endpoints
///
/// - `POST /v1/auth/token` - Exchange username/password for a token pair
/// - `POST /v1/auth/token/refresh` - Exchange a refresh token for a new
///   access token
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use trackdesk_shared::auth::{jwt, password};
use trackdesk_shared::models::user::User;

/// Token request
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Username
    pub username: String,

    /// Password
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Access token (24h)
    pub access: String,

    /// Refresh token (30d)
    pub refresh: String,
}

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access: String,
}

/// Obtain a token pair
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/token
/// Content-Type: application/json
///
/// { "username": "alice", "password": "..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: unknown username or wrong password (the two cases
///   are indistinguishable on the wire)
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let access = jwt::create_token(
        &jwt::Claims::new(user.id, jwt::TokenType::Access),
        state.jwt_secret(),
    )?;
    let refresh = jwt::create_token(
        &jwt::Claims::new(user.id, jwt::TokenType::Refresh),
        state.jwt_secret(),
    )?;

    Ok(Json(TokenResponse { access, refresh }))
}

/// Refresh an access token
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/token/refresh
/// Content-Type: application/json
///
/// { "refresh": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: expired or invalid refresh token, or the account
///   no longer exists
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh, state.jwt_secret())?;

    // A deleted account's refresh tokens must stop working immediately.
    if User::find_by_id(&state.db, claims.sub).await?.is_none() {
        return Err(ApiError::Unauthorized("Account no longer exists".to_string()));
    }

    let access = jwt::create_token(
        &jwt::Claims::new(claims.sub, jwt::TokenType::Access),
        state.jwt_secret(),
    )?;

    Ok(Json(RefreshResponse { access }))
}
