//! Storage seam for the admin services.

use std::future::Future;

use sillage_core::inventory::{InventoryLogEntry, InventoryRecord, StockReduction};
use sillage_core::order::OrderWithItems;
use sillage_core::{OrderId, OrderStatus, PerfumeId};

use crate::db::RepositoryError;

/// Everything the inventory and order services read or write.
///
/// Implemented over `PostgreSQL` by [`crate::db::PgAdminStore`].
pub trait AdminStore: Send + Sync {
    /// Every stock record with its perfume name.
    fn list_inventory(
        &self,
    ) -> impl Future<Output = Result<Vec<InventoryRecord>, RepositoryError>> + Send;

    /// The newest `limit` manual adjustments.
    fn list_log(
        &self,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<InventoryLogEntry>, RepositoryError>> + Send;

    /// One order with its items.
    fn order(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<OrderWithItems>, RepositoryError>> + Send;

    /// Recent orders with their items, newest first.
    fn list_orders(
        &self,
    ) -> impl Future<Output = Result<Vec<OrderWithItems>, RepositoryError>> + Send;

    /// Subtract every reduction from its stock record, all or nothing.
    fn apply_reductions(
        &self,
        reductions: &[StockReduction],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Read the old quantity (0 when absent), store the new one and append a
    /// log entry, all or nothing.
    fn set_quantity_logged(
        &self,
        perfume_id: PerfumeId,
        new_quantity: i32,
        reason: &str,
    ) -> impl Future<Output = Result<InventoryLogEntry, RepositoryError>> + Send;

    /// Move an order from `from` to `to`; fails with `Conflict` if its status
    /// is no longer `from`.
    fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Apply reductions and mark the order delivered, all or nothing.
    fn deliver_order(
        &self,
        id: OrderId,
        reductions: &[StockReduction],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
