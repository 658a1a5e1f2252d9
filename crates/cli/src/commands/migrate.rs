//! Database migration command.
//!
//! Storefront and admin share one database, so there is one migration set:
//! `migrations/` at the workspace root.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::{CommandError, database_url};

/// Run every pending migration.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
