//! Order fulfilment.

use thiserror::Error;
use tracing::{error, info, instrument};

use sillage_core::inventory::reductions_for;
use sillage_core::order::OrderWithItems;
use sillage_core::{OrderId, OrderStatus};

use super::{AdminStore, ViewCache};
use crate::db::RepositoryError;

/// Errors from order status changes.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(OrderId),

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Order operations over an [`AdminStore`].
pub struct OrderService<'a, S> {
    store: &'a S,
    views: &'a ViewCache,
}

impl<'a, S: AdminStore> OrderService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, views: &'a ViewCache) -> Self {
        Self { store, views }
    }

    /// Move an order forward to `status`.
    ///
    /// Delivering an order reduces stock for its items in the same
    /// transaction as the status change.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown order, `InvalidTransition` for a
    /// backwards or repeated move, or the store error if the write fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn advance_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderWithItems, OrderError> {
        let mut order = self.store.order(id).await?.ok_or(OrderError::NotFound(id))?;

        let from = order.order.status;
        if !from.can_advance_to(status) {
            return Err(OrderError::InvalidTransition { from, to: status });
        }

        let result = if status == OrderStatus::Delivered {
            let reductions = reductions_for(&order.items);
            self.store.deliver_order(id, &reductions).await
        } else {
            self.store.update_status(id, from, status).await
        };
        result.inspect_err(|e| error!(error = %e, "failed to update order status"))?;

        info!(%from, "Order status advanced");
        order.order.status = status;
        self.views.refresh(self.store).await;
        Ok(order)
    }
}
