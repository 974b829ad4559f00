/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup
/// - Test user creation with real password hashes
/// - JWT token generation
/// - Request helpers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use sqlx::PgPool;
use tower::Service as _;
use trackdesk_api::app::{build_router, AppState};
use trackdesk_api::config::Config;
use trackdesk_shared::auth::jwt::{create_token, Claims, TokenType};
use trackdesk_shared::auth::password::hash_password;
use trackdesk_shared::models::project::{CreateProject, Project, ProjectKind};
use trackdesk_shared::models::user::{CreateUser, User};
use uuid::Uuid;

/// Plaintext password shared by all test users
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Migrations live in the shared crate (path relative to Cargo.toml)
        sqlx::migrate!("../trackdesk-shared/migrations").run(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Creates a test user with a real Argon2id hash of [`TEST_PASSWORD`]
    pub async fn create_user(&self, label: &str) -> anyhow::Result<User> {
        let tag = Uuid::new_v4();
        let user = User::create(
            &self.db,
            CreateUser {
                username: format!("{}-{}", label, tag),
                email: format!("{}-{}@example.com", label, tag),
                password_hash: hash_password(TEST_PASSWORD)?,
                birthdate: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
                can_be_contacted: true,
                can_be_shared: true,
            },
        )
        .await?;

        Ok(user)
    }

    /// Mints an access token for a user, bypassing the login endpoint
    pub fn token_for(&self, user: &User) -> anyhow::Result<String> {
        let claims = Claims::new(user.id, TokenType::Access);
        Ok(create_token(&claims, &self.config.jwt.secret)?)
    }

    /// Creates a project owned by the given user, directly in the database
    pub async fn create_project(&self, author: &User) -> anyhow::Result<Project> {
        let project = Project::create(
            &self.db,
            CreateProject {
                name: format!("Test Project {}", Uuid::new_v4()),
                description: None,
                kind: ProjectKind::Backend,
                author_id: author.id,
            },
        )
        .await?;

        Ok(project)
    }

    /// Deletes a test user; related rows cascade
    pub async fn cleanup_user(&self, user: &User) -> anyhow::Result<()> {
        User::delete(&self.db, user.id).await?;
        Ok(())
    }
}

/// Sends a request through the router and returns status plus parsed body
///
/// `token` is the raw JWT (no "Bearer " prefix); `None` sends no
/// authorization header. An empty response body parses as JSON null.
pub async fn send(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = ctx.app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
