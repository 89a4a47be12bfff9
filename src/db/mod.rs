//! Database pool initialization and optional migration runner.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connect to Postgres, running the bundled migrations when asked.
///
/// The hosted backend normally owns the schema; migrations exist for local
/// development databases.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, run_migrations: bool) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new().max_connections(5).connect(database_url).await?;

    if run_migrations {
        sqlx::migrate!("src/db/migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    Ok(pool)
}
