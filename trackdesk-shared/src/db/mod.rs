/// Database layer: connection pooling and migrations
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool creation and health checks
/// - `migrations`: migration runner for the SQL files in `migrations/`
pub mod migrations;
pub mod pool;
