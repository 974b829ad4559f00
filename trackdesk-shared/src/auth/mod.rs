/// Authentication boundary layer
///
/// Credential handling is deliberately thin: by the time a request reaches
/// the authorization core it has been reduced to an `authz::Actor`.
///
/// # Modules
///
/// - `jwt`: HS256 access/refresh token creation and validation
/// - `password`: Argon2id password hashing and verification
/// - `middleware`: bearer-token → actor extraction for Axum
pub mod jwt;
pub mod middleware;
pub mod password;
