/// Database models for TrackDesk
///
/// Each model owns its CRUD operations as static methods taking an explicit
/// pool (or executor) handle.
///
/// # Models
///
/// - `user`: accounts, with the age-based consent rules
/// - `project`: projects, with transactional author enrollment
/// - `contributor`: the membership registry (user-project join rows)
/// - `issue`: issues filed against a project
/// - `comment`: comments on issues
pub mod comment;
pub mod contributor;
pub mod issue;
pub mod project;
pub mod user;
