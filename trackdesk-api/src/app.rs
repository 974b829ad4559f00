/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use trackdesk_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = trackdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use trackdesk_shared::auth::middleware::actor_from_headers;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Liveness probe (public)
/// └── /v1/
///     ├── /auth/token                # Login (public)
///     ├── /auth/token/refresh        # Token refresh (public)
///     ├── /users                     # Registration (public) + account CRUD
///     ├── /projects                  # Project CRUD
///     ├── /contributors              # Membership management
///     ├── /issues                    # Issue CRUD
///     └── /comments                  # Comment CRUD
/// ```
///
/// Every `/v1` route passes through the actor layer, which decodes the
/// bearer token (if any) into an `authz::Actor` request extension. Routes
/// are never rejected there; the authorization engine decides, so public
/// endpoints and protected ones share one stack and unauthenticated
/// requests get a uniform 401 from the engine.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/token", post(routes::auth::obtain_token))
        .route("/token/refresh", post(routes::auth::refresh_token));

    let user_routes = Router::new()
        .route("/", post(routes::users::create_user))
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", patch(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user));

    let project_routes = Router::new()
        .route("/", post(routes::projects::create_project))
        .route("/", get(routes::projects::list_projects))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", patch(routes::projects::update_project))
        .route("/:id", delete(routes::projects::delete_project));

    let contributor_routes = Router::new()
        .route("/", post(routes::contributors::add_contributor))
        .route("/", get(routes::contributors::list_contributors))
        .route(
            "/:project_id/:user_id",
            delete(routes::contributors::remove_contributor),
        );

    let issue_routes = Router::new()
        .route("/", post(routes::issues::create_issue))
        .route("/", get(routes::issues::list_issues))
        .route("/:id", get(routes::issues::get_issue))
        .route("/:id", patch(routes::issues::update_issue))
        .route("/:id", delete(routes::issues::delete_issue));

    let comment_routes = Router::new()
        .route("/", post(routes::comments::create_comment))
        .route("/", get(routes::comments::list_comments))
        .route("/:id", get(routes::comments::get_comment))
        .route("/:id", patch(routes::comments::update_comment))
        .route("/:id", delete(routes::comments::delete_comment));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/contributors", contributor_routes)
        .nest("/issues", issue_routes)
        .nest("/comments", comment_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            actor_layer,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Actor extraction middleware
///
/// Decodes the bearer token into an `Actor` extension. Requests without a
/// valid access token proceed as `Actor::Anonymous` and are rejected later
/// by the authorization engine where authentication is required.
async fn actor_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let actor = actor_from_headers(req.headers(), state.jwt_secret());
    req.extensions_mut().insert(actor);

    next.run(req).await
}

#[cfg(test)]
mod tests {
    // Router construction is covered by the integration tests, which build
    // the full app against a live database.
}
