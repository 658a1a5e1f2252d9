//! Saved perfumes per account.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use sillage_core::{PerfumeId, UserId, WishlistItemId};

use super::RepositoryError;
use crate::models::WishlistItem;

/// Repository for wishlist entries.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct WishlistRow {
    id: WishlistItemId,
    perfume_id: PerfumeId,
    name: String,
    display_price: String,
    price: Decimal,
    created_at: DateTime<Utc>,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The owner's wishlist, most recently saved first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r"
            SELECT w.id, w.perfume_id, p.name, p.display_price, p.price, w.created_at
            FROM wishlist w
            JOIN perfumes p ON p.id = w.perfume_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC, w.id DESC
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| WishlistItem {
                id: row.id,
                perfume_id: row.perfume_id,
                name: row.name,
                display_price: row.display_price,
                price: row.price,
                created_at: row.created_at,
            })
            .collect())
    }

    /// Save a perfume. Returns `false` if it was already saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(&self, owner: UserId, perfume_id: PerfumeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO wishlist (user_id, perfume_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, perfume_id) DO NOTHING
            ",
        )
        .bind(owner)
        .bind(perfume_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a saved perfume.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if it was not saved.
    pub async fn remove(&self, owner: UserId, perfume_id: PerfumeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND perfume_id = $2")
            .bind(owner)
            .bind(perfume_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
