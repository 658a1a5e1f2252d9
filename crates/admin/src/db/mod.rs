//! Database operations for the admin panel.
//!
//! The admin panel shares the storefront's `PostgreSQL` database. It owns
//! the stock tables and reads orders placed through the storefront.
//!
//! ## Tables used here
//!
//! - `inventory` - Stock count per perfume (may go negative)
//! - `inventory_log` - Manual adjustments with reasons
//! - `orders`, `order_items` - Read, status advanced on fulfilment
//! - `perfumes` - Names for the inventory list
//! - `tower_sessions.session` - Admin session storage
//!
//! # Migrations
//!
//! Migrations live in the workspace `migrations/` directory and run via:
//! ```bash
//! cargo run -p sillage-cli -- migrate
//! ```

pub mod inventory;
pub mod orders;
pub mod store;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use sillage_core::PerfumeId;

pub use inventory::InventoryRepository;
pub use orders::OrderRepository;
pub use store::PgAdminStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation or a write that lost a race.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A stock reduction targeted a perfume with no inventory record.
    #[error("no inventory record for perfume {0}")]
    MissingInventory(PerfumeId),
}

impl RepositoryError {
    /// Map a foreign-key violation into `NotFound`, anything else into `Database`.
    pub(crate) fn from_write(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_foreign_key_violation()
        {
            return Self::NotFound;
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
