//! Stock adjustments.
//!
//! Stock moves two ways:
//!
//! - **Order-driven**: every perfume in an order is reduced by its ordered
//!   quantity. Nothing is written to the inventory log.
//! - **Manual**: an admin sets a new absolute quantity with a reason. The
//!   old and new quantity land in the inventory log.
//!
//! Both paths refresh the cached admin views afterwards.

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use sillage_core::inventory::{InventoryLogEntry, StockReduction, reductions_for};
use sillage_core::{OrderId, PerfumeId};

use super::{AdminStore, ViewCache};
use crate::db::RepositoryError;

/// Errors from stock adjustments.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("a reason is required for manual adjustments")]
    BlankReason,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Inventory operations over an [`AdminStore`].
pub struct InventoryService<'a, S> {
    store: &'a S,
    views: &'a ViewCache,
}

impl<'a, S: AdminStore> InventoryService<'a, S> {
    /// Create a new inventory service.
    #[must_use]
    pub const fn new(store: &'a S, views: &'a ViewCache) -> Self {
        Self { store, views }
    }

    /// Reduce stock by every item of an order.
    ///
    /// All reductions apply or none do.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound` for an unknown order, or the store error if
    /// any reduction fails (for example a perfume with no stock record).
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn reduce_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<StockReduction>, InventoryError> {
        let order = self
            .store
            .order(order_id)
            .await
            .inspect_err(|e| error!(error = %e, "failed to load order for stock reduction"))?
            .ok_or(InventoryError::OrderNotFound(order_id))?;

        let reductions = reductions_for(&order.items);
        self.store
            .apply_reductions(&reductions)
            .await
            .inspect_err(|e| error!(error = %e, "failed to reduce stock for order"))?;

        info!(perfumes = reductions.len(), "Reduced stock for order");
        self.views.refresh(self.store).await;
        Ok(reductions)
    }

    /// Set a perfume's stock to `new_quantity` and log the change.
    ///
    /// A perfume without a stock record is treated as having 0 and gets one.
    ///
    /// # Errors
    ///
    /// Returns `BlankReason` before touching the store if `reason` is blank,
    /// or the store error if the write fails.
    #[instrument(skip(self, reason), fields(perfume_id = %perfume_id))]
    pub async fn adjust_manually(
        &self,
        perfume_id: PerfumeId,
        new_quantity: i32,
        reason: &str,
    ) -> Result<InventoryLogEntry, InventoryError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(InventoryError::BlankReason);
        }
        if new_quantity < 0 {
            warn!(new_quantity, "Setting negative stock");
        }

        let entry = self
            .store
            .set_quantity_logged(perfume_id, new_quantity, reason)
            .await
            .inspect_err(|e| error!(error = %e, "failed to adjust stock"))?;

        info!(
            old = entry.old_quantity,
            new = entry.new_quantity,
            "Adjusted stock manually"
        );
        self.views.refresh(self.store).await;
        Ok(entry)
    }
}
