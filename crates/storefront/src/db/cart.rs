//! Account cart rows.
//!
//! Plain queries against `cart`, plus the `get_cart_with_perfumes` function
//! for the joined view.

use rust_decimal::Decimal;
use sqlx::PgPool;

use sillage_core::cart::CartLine;
use sillage_core::{CartLineId, PerfumeId, Quantity, UserId};

use super::{RepositoryError, stored_quantity};
use crate::models::CartItemView;
use crate::services::cart::CartStore;

/// Repository for account cart rows.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartLineId,
    user_id: UserId,
    perfume_id: PerfumeId,
    quantity: i32,
}

impl TryFrom<CartRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            owner: row.user_id,
            perfume_id: row.perfume_id,
            quantity: stored_quantity(row.quantity)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartPerfumeRow {
    id: CartLineId,
    perfume_id: PerfumeId,
    quantity: i32,
    name: String,
    display_price: String,
    price: Decimal,
    image_url: Option<String>,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Cart rows joined with perfume name, price and lead image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the call fails.
    pub async fn items_with_perfumes(
        &self,
        owner: UserId,
    ) -> Result<Vec<CartItemView>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartPerfumeRow>(
            r"
            SELECT id, perfume_id, quantity, name, display_price, price, image_url
            FROM get_cart_with_perfumes($1)
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CartItemView {
                    line_id: Some(row.id),
                    perfume_id: row.perfume_id,
                    name: row.name,
                    display_price: row.display_price,
                    unit_price: row.price,
                    quantity: stored_quantity(row.quantity)?,
                    image_url: row.image_url,
                })
            })
            .collect()
    }
}

impl CartStore for CartRepository<'_> {
    async fn lines(&self, owner: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, user_id, perfume_id, quantity
            FROM cart
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    async fn insert_line(
        &self,
        owner: UserId,
        perfume_id: PerfumeId,
        quantity: Quantity,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO cart (user_id, perfume_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, perfume_id, quantity
            ",
        )
        .bind(owner)
        .bind(perfume_id)
        .bind(quantity.get())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    async fn set_line_quantity(
        &self,
        line: CartLineId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cart SET quantity = $2 WHERE id = $1")
            .bind(line)
            .bind(quantity.get())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_line(&self, line: CartLineId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart WHERE id = $1")
            .bind(line)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn collapse_lines(
        &self,
        survivor: CartLineId,
        removed: &[CartLineId],
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let removed: Vec<i32> = removed.iter().map(CartLineId::as_i32).collect();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart WHERE id = ANY($1)")
            .bind(&removed)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("UPDATE cart SET quantity = $2 WHERE id = $1")
            .bind(survivor)
            .bind(quantity.get())
            .execute(&mut *tx)
            .await?;

        // Dropping the transaction rolls the deletes back.
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self, owner: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart WHERE user_id = $1")
            .bind(owner)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
