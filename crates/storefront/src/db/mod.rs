//! Database operations for the storefront.
//!
//! # Database
//!
//! The storefront talks to a hosted `PostgreSQL` instance shared with the
//! admin panel. Every call is a plain request/response query; the only
//! server-side logic is the `get_cart_with_perfumes` function.
//!
//! ## Tables used here
//!
//! - `users` - Storefront accounts (argon2 password hashes)
//! - `perfumes`, `perfume_images` - Catalog (read-only from the storefront)
//! - `cart` - Account cart rows (no uniqueness per user/perfume)
//! - `orders`, `order_items` - Created at checkout, read for order history
//! - `wishlist` - Saved perfumes per user
//! - `newsletter_subscriptions` - Newsletter signups
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations live in the workspace `migrations/` directory and run via:
//! ```bash
//! cargo run -p sillage-cli -- migrate
//! ```

pub mod cart;
pub mod newsletter;
pub mod orders;
pub mod perfumes;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use newsletter::NewsletterRepository;
pub use orders::OrderRepository;
pub use perfumes::PerfumeRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-violation into `Conflict`, anything else into `Database`.
    pub(crate) fn from_insert(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
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

/// Decode a stored quantity, flagging rows that violate the `>= 1` check.
pub(crate) fn stored_quantity(value: i32) -> Result<sillage_core::Quantity, RepositoryError> {
    sillage_core::Quantity::new(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid stored quantity: {e}")))
}
