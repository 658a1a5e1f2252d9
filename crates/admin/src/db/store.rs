//! `PostgreSQL` implementation of [`AdminStore`].

use sqlx::PgPool;

use sillage_core::inventory::{InventoryLogEntry, InventoryRecord, StockReduction};
use sillage_core::order::OrderWithItems;
use sillage_core::{OrderId, OrderStatus, PerfumeId};

use super::{InventoryRepository, OrderRepository, RepositoryError};
use crate::services::AdminStore;

/// Admin store over the shared database.
pub struct PgAdminStore<'a> {
    inventory: InventoryRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> PgAdminStore<'a> {
    /// Create a store over `pool`.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            inventory: InventoryRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }
}

impl AdminStore for PgAdminStore<'_> {
    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>, RepositoryError> {
        self.inventory.list().await
    }

    async fn list_log(&self, limit: i64) -> Result<Vec<InventoryLogEntry>, RepositoryError> {
        self.inventory.log(limit).await
    }

    async fn order(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        self.orders.get(id).await
    }

    async fn list_orders(&self) -> Result<Vec<OrderWithItems>, RepositoryError> {
        self.orders.list().await
    }

    async fn apply_reductions(&self, reductions: &[StockReduction]) -> Result<(), RepositoryError> {
        self.inventory.apply_reductions(reductions).await
    }

    async fn set_quantity_logged(
        &self,
        perfume_id: PerfumeId,
        new_quantity: i32,
        reason: &str,
    ) -> Result<InventoryLogEntry, RepositoryError> {
        self.inventory
            .set_quantity_logged(perfume_id, new_quantity, reason)
            .await
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), RepositoryError> {
        self.orders.update_status(id, from, to).await
    }

    async fn deliver_order(
        &self,
        id: OrderId,
        reductions: &[StockReduction],
    ) -> Result<(), RepositoryError> {
        self.orders.deliver(id, reductions).await
    }
}
