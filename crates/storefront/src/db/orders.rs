//! Orders placed through the storefront.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use sillage_core::order::{self, NewOrderItem, Order, OrderItem, OrderWithItems};
use sillage_core::{CartLineId, OrderId, OrderItemId, OrderStatus, PerfumeId, UserId};

use super::{RepositoryError, stored_quantity};

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

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            status: row.status,
            total: row.total,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    perfume_id: PerfumeId,
    quantity: i32,
    unit_price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            perfume_id: row.perfume_id,
            quantity: stored_quantity(row.quantity)?,
            unit_price: row.unit_price,
        })
    }
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Write an order with its items and delete the cart rows it was priced
    /// from, atomically.
    ///
    /// Only `ordered_lines` are deleted; a row added to the cart after it was
    /// read stays for the next checkout. The stored total is the sum of the
    /// item subtotals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn create_from_cart(
        &self,
        owner: UserId,
        ordered_lines: &[CartLineId],
        items: &[NewOrderItem],
    ) -> Result<OrderWithItems, RepositoryError> {
        let ordered_lines: Vec<i32> = ordered_lines.iter().map(CartLineId::as_i32).collect();
        let mut tx = self.pool.begin().await?;

        let order: Order = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, total)
            VALUES ($1, $2)
            RETURNING id, user_id, status, total, created_at
            ",
        )
        .bind(owner)
        .bind(order::order_total(items))
        .fetch_one(&mut *tx)
        .await?
        .into();

        let mut written = Vec::with_capacity(items.len());
        for (position, item) in (0_i32..).zip(items) {
            let row = sqlx::query_as::<_, OrderItemRow>(
                r"
                INSERT INTO order_items (order_id, perfume_id, quantity, unit_price, position)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, perfume_id, quantity, unit_price
                ",
            )
            .bind(order.id)
            .bind(item.perfume_id)
            .bind(item.quantity.get())
            .bind(item.unit_price)
            .bind(position)
            .fetch_one(&mut *tx)
            .await?;
            written.push(OrderItem::try_from(row)?);
        }

        sqlx::query("DELETE FROM cart WHERE user_id = $1 AND id = ANY($2)")
            .bind(owner)
            .bind(&ordered_lines)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(OrderWithItems {
            order,
            items: written,
        })
    }

    /// Orders for one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, status, total, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// One order with its items, only if it belongs to `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        owner: UserId,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let Some(order) = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, status, total, created_at
            FROM orders
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
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

        Ok(Some(OrderWithItems {
            order: order.into(),
            items,
        }))
    }
}
