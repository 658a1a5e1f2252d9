//! Stock records and the manual adjustment log.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use sillage_core::inventory::{InventoryLogEntry, InventoryRecord, StockReduction};
use sillage_core::{InventoryLogId, PerfumeId};

use super::RepositoryError;

/// Repository for `inventory` and `inventory_log`.
pub struct InventoryRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct InventoryRow {
    perfume_id: PerfumeId,
    perfume_name: String,
    quantity: i32,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LogRow {
    id: InventoryLogId,
    perfume_id: PerfumeId,
    old_quantity: i32,
    new_quantity: i32,
    reason: String,
    created_at: DateTime<Utc>,
}

impl From<LogRow> for InventoryLogEntry {
    fn from(row: LogRow) -> Self {
        Self {
            id: row.id,
            perfume_id: row.perfume_id,
            old_quantity: row.old_quantity,
            new_quantity: row.new_quantity,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

impl<'a> InventoryRepository<'a> {
    /// Create a new inventory repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every stock record with its perfume name, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<InventoryRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r"
            SELECT i.perfume_id, p.name AS perfume_name, i.quantity, i.updated_at
            FROM inventory i
            JOIN perfumes p ON p.id = i.perfume_id
            ORDER BY p.name, i.perfume_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| InventoryRecord {
                perfume_id: row.perfume_id,
                perfume_name: row.perfume_name,
                quantity: row.quantity,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Most recent manual adjustments, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn log(&self, limit: i64) -> Result<Vec<InventoryLogEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, LogRow>(
            r"
            SELECT id, perfume_id, old_quantity, new_quantity, reason, created_at
            FROM inventory_log
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(InventoryLogEntry::from).collect())
    }

    /// Apply every reduction or none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingInventory` if a perfume has no stock
    /// record; nothing is changed in that case.
    pub async fn apply_reductions(&self, reductions: &[StockReduction]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        apply_reductions_in(&mut *tx, reductions).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Set a perfume's stock and log the change, atomically.
    ///
    /// A perfume with no record is treated as holding 0 and gets one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the perfume does not exist.
    pub async fn set_quantity_logged(
        &self,
        perfume_id: PerfumeId,
        new_quantity: i32,
        reason: &str,
    ) -> Result<InventoryLogEntry, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let old_quantity: i32 = sqlx::query_scalar(
            "SELECT quantity FROM inventory WHERE perfume_id = $1 FOR UPDATE",
        )
        .bind(perfume_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        sqlx::query(
            r"
            INSERT INTO inventory (perfume_id, quantity, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (perfume_id)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()
            ",
        )
        .bind(perfume_id)
        .bind(new_quantity)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from_write)?;

        let entry = sqlx::query_as::<_, LogRow>(
            r"
            INSERT INTO inventory_log (perfume_id, old_quantity, new_quantity, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING id, perfume_id, old_quantity, new_quantity, reason, created_at
            ",
        )
        .bind(perfume_id)
        .bind(old_quantity)
        .bind(new_quantity)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_write)?;

        tx.commit().await?;
        Ok(entry.into())
    }
}

/// Subtract each reduction from its stock record on `conn`.
///
/// Stops at the first perfume without a record; the caller's transaction
/// must then be rolled back.
pub(crate) async fn apply_reductions_in(
    conn: &mut PgConnection,
    reductions: &[StockReduction],
) -> Result<(), RepositoryError> {
    for reduction in reductions {
        let result = sqlx::query(
            r"
            UPDATE inventory
            SET quantity = quantity - $2, updated_at = now()
            WHERE perfume_id = $1
            ",
        )
        .bind(reduction.perfume_id)
        .bind(reduction.quantity)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::MissingInventory(reduction.perfume_id));
        }
    }
    Ok(())
}
