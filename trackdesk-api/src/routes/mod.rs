/// API route handlers, organized by resource
///
/// - `health`: liveness probe
/// - `auth`: token issuance and refresh
/// - `users`: registration and account management
/// - `projects`: project CRUD
/// - `contributors`: membership management
/// - `issues`: issue CRUD with assignee validation
/// - `comments`: comment CRUD
pub mod auth;
pub mod comments;
pub mod contributors;
pub mod health;
pub mod issues;
pub mod projects;
pub mod users;
