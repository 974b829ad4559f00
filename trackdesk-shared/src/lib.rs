//! # TrackDesk Shared Library
//!
//! Shared types and business logic for the TrackDesk issue-tracking backend.
//!
//! ## Module Organization
//!
//! - `models`: database models (users, projects, contributors, issues, comments)
//! - `authz`: the authorization core (resolver, policy engine, assignment validator)
//! - `auth`: authentication boundary (JWT, password hashing, actor extraction)
//! - `db`: connection pooling and migrations

pub mod auth;
pub mod authz;
pub mod db;
pub mod models;

/// Current version of the TrackDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
