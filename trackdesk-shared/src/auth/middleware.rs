/// Actor extraction for Axum requests
///
/// The authorization core works on an [`Actor`] (an authenticated user ID
/// or an explicit anonymous marker), never on raw credentials. This module
/// turns an incoming request's `Authorization` header into that actor.
///
/// A missing, malformed, or invalid bearer token all yield
/// `Actor::Anonymous`; the engine then rejects with `Unauthenticated`, which
/// the API maps to 401. Routes are not short-circuited here, so public
/// endpoints (registration, login) share the same layer.
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use trackdesk_shared::authz::Actor;
///
/// async fn handler(Extension(actor): Extension<Actor>) -> String {
///     match actor.user_id() {
///         Some(id) => format!("user {id}"),
///         None => "anonymous".to_string(),
///     }
/// }
/// ```
use axum::http::{header, HeaderMap};
use tracing::debug;

use super::jwt;
use crate::authz::Actor;

/// Derives the request actor from the `Authorization` header
///
/// Accepts `Bearer <access-token>`; anything else is anonymous.
pub fn actor_from_headers(headers: &HeaderMap, jwt_secret: &str) -> Actor {
    let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return Actor::Anonymous;
    };

    match jwt::validate_access_token(token, jwt_secret) {
        Ok(claims) => Actor::User(claims.sub),
        Err(e) => {
            debug!("bearer token rejected: {}", e);
            Actor::Anonymous
        }
    }
}
