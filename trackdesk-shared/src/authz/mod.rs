/// Authorization core
///
/// Decides, for every request, whether an actor may read or mutate a given
/// resource. Two independent policies are evaluated per request:
///
/// 1. **Membership policy**: the actor must be a contributor of the
///    resource's owning project to act at all (read included).
/// 2. **Authorship policy**: update and delete additionally require the
///    actor to be the resource's author.
///
/// Unauthenticated actors are rejected before either policy runs, with a
/// distinct error so the calling layer can answer 401 rather than 403.
///
/// # Modules
///
/// - `resolver`: maps any resource (or creation payload) to its owning project
/// - `engine`: evaluates the two policies in order
/// - `assignment`: validates issue assignees against project membership
///
/// # Example
///
/// ```no_run
/// use trackdesk_shared::authz::{engine, resolver::Resource, Action, Actor};
/// # use sqlx::PgPool;
/// # use trackdesk_shared::models::issue::Issue;
/// # async fn example(pool: PgPool, issue: Issue) -> anyhow::Result<()> {
/// let actor = Actor::User(42);
/// engine::authorize(&pool, &actor, Action::Delete, &Resource::Issue(issue)).await?;
/// # Ok(())
/// # }
/// ```
use serde::{Deserialize, Serialize};

pub mod assignment;
pub mod engine;
pub mod resolver;

pub use engine::Action;

/// The identity a request acts under
///
/// Supplied by the request-handling layer: either an authenticated user ID
/// or an explicit anonymous marker. The engine never sees raw credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// No identity was presented (or the presented token was invalid)
    Anonymous,

    /// Authenticated user
    User(i64),
}

impl Actor {
    /// Returns the user ID, or `None` for an anonymous actor
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Actor::Anonymous => None,
            Actor::User(id) => Some(*id),
        }
    }
}

/// Error type for authorization decisions
///
/// The variants map one-to-one onto the calling layer's status codes:
/// `Unauthenticated` → 401, `Forbidden` → 403, `UnresolvableParent` → 404.
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// No actor identity at all; checked before any policy runs
    #[error("Authentication required")]
    Unauthenticated,

    /// Actor identity present but the membership or authorship policy failed
    ///
    /// Deliberately carries no detail: a non-member must not learn whether
    /// the resource exists or who authored it.
    #[error("Forbidden")]
    Forbidden,

    /// A creation payload referenced a parent that does not exist
    ///
    /// Reported as not-found, never as a permission failure, so a mistyped
    /// id is distinguishable from a denied one.
    #[error("{kind} {id} does not exist")]
    UnresolvableParent { kind: &'static str, id: i64 },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
