//! # TrackDesk API Server
//!
//! Issue-tracking backend: projects, contributor memberships, issues, and
//! comments behind a membership/authorship permission model.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/trackdesk \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p trackdesk-api
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackdesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use trackdesk_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TrackDesk API server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    Ok(())
}
