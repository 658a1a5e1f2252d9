//! Cart maintenance commands.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use sillage_core::UserId;
use sillage_storefront::db::CartRepository;
use sillage_storefront::services::CartService;
use sillage_storefront::signals::CartSignals;

use super::database_url;

/// Collapse duplicate cart rows for one account.
///
/// Runs the same cleanup the storefront runs on sign-in and checkout.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a collapse fails.
pub async fn dedupe(user: i32) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let store = CartRepository::new(&pool);
    // No subscribers in this process
    let signals = CartSignals::new();
    let report = CartService::new(&store, &signals)
        .remove_duplicates(UserId::new(user))
        .await?;

    tracing::info!(
        user_id = user,
        groups = report.groups_collapsed,
        rows_removed = report.rows_removed,
        "Cart cleanup complete"
    );
    Ok(())
}
