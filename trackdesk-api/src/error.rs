/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>` which converts to the appropriate status code:
///
/// - `Unauthenticated` core rejections become 401
/// - `Forbidden` core rejections become 403
/// - unresolvable parent references become 404
/// - duplicate memberships become 409
/// - assignee/consent validation failures become 422 with a field-keyed body
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use trackdesk_shared::auth::{jwt::JwtError, password::PasswordError};
use trackdesk_shared::authz::{assignment::AssignmentError, AuthzError};
use trackdesk_shared::models::contributor::MembershipError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate contributor pair or taken username
    Conflict(String),

    /// Unprocessable entity (422) - field-scoped validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "forbidden", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Shorthand for a single field-scoped validation failure
    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.to_string(),
            message: message.into(),
        }])
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Conflict("Username already exists".to_string());
                    }
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    if constraint.contains("name") {
                        return ApiError::Conflict("Name already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert authorization decisions to API errors
///
/// The exhaustive match keeps the status mapping total: a new core error
/// variant cannot ship without a wire-level decision here.
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => {
                ApiError::Unauthorized("Authentication required".to_string())
            }
            AuthzError::Forbidden => ApiError::Forbidden(
                "You must be a contributor of this project to do that".to_string(),
            ),
            AuthzError::UnresolvableParent { kind, id } => {
                ApiError::NotFound(format!("{} {} does not exist", kind, id))
            }
            AuthzError::Database(e) => e.into(),
        }
    }
}

/// Convert membership registry errors to API errors
impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::DuplicateMembership { .. } => {
                ApiError::Conflict("User is already a contributor of this project".to_string())
            }
            MembershipError::Database(e) => e.into(),
        }
    }
}

/// Convert assignee validation failures to API errors
///
/// Field-scoped on `assign_to`, never a 403: this is a content-validation
/// concern even though it consults membership.
impl From<AssignmentError> for ApiError {
    fn from(err: AssignmentError) -> Self {
        match err {
            AssignmentError::InvalidAssignee { .. } => {
                ApiError::field_error("assign_to", "Assignee must be a contributor of the project")
            }
            AssignmentError::Database(e) => e.into(),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert `validator` derive failures to field-keyed validation errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Forbidden("nope".to_string());
        assert_eq!(err.to_string(), "Forbidden: nope");

        let err = ApiError::NotFound("project 9 does not exist".to_string());
        assert_eq!(err.to_string(), "Not found: project 9 does not exist");
    }

    #[test]
    fn test_authz_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthzError::Unauthenticated),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthzError::Forbidden),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(AuthzError::UnresolvableParent {
                kind: "issue",
                id: 3
            }),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_duplicate_membership_maps_to_conflict() {
        let err = ApiError::from(MembershipError::DuplicateMembership {
            project_id: 1,
            user_id: 2,
        });
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_invalid_assignee_is_field_scoped() {
        let err = ApiError::from(AssignmentError::InvalidAssignee {
            project_id: 1,
            user_id: 2,
        });
        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "assign_to");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
