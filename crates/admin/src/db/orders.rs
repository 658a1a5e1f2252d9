//! Orders as seen by the admin panel.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use sillage_core::inventory::StockReduction;
use sillage_core::order::{Order, OrderItem, OrderWithItems};
use sillage_core::{OrderId, OrderItemId, OrderStatus, PerfumeId, Quantity, UserId};

use super::RepositoryError;
use super::inventory::apply_reductions_in;

/// Most orders the admin list shows.
const ORDER_LIST_LIMIT: i64 = 200;

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    total: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: OrderItemId,
    order_id: OrderId,
    perfume_id: PerfumeId,
    quantity: i32,
    unit_price: Decimal,
}

impl TryFrom<ItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("order item {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            perfume_id: row.perfume_id,
            quantity,
            unit_price: row.unit_price,
        })
    }
}

fn order_from(row: OrderRow, items: Vec<OrderItem>) -> OrderWithItems {
    OrderWithItems {
        order: Order {
            id: row.id,
            user_id: row.user_id,
            status: row.status,
            total: row.total,
            created_at: row.created_at,
        },
        items,
    }
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, status, total, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, order_id, perfume_id, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY position
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(order_from(row, items)))
    }

    /// Recent orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, status, total, created_at
            FROM orders
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(ORDER_LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let mut items: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, order_id, perfume_id, quantity, unit_price
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?
        {
            let item = OrderItem::try_from(row)?;
            items.entry(item.order_id).or_default().push(item);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                order_from(row, order_items)
            })
            .collect())
    }

    /// Move an order from `from` to `to`.
    ///
    /// The write only applies while the order still holds `from`, so a
    /// concurrent change is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is missing or its
    /// status is no longer `from`.
    pub async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(from)
            .bind(to)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "order {id} is no longer {from}"
            )));
        }
        Ok(())
    }

    /// Reduce stock for the order and mark it delivered, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is already delivered
    /// (or missing), and `RepositoryError::MissingInventory` if a perfume has
    /// no stock record. Nothing changes on error.
    pub async fn deliver(
        &self,
        id: OrderId,
        reductions: &[StockReduction],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE orders
            SET status = 'delivered'
            WHERE id = $1 AND status <> 'delivered'
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "order {id} is already delivered"
            )));
        }

        apply_reductions_in(&mut *tx, reductions).await?;

        tx.commit().await?;
        Ok(())
    }
}
