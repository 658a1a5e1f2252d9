//! Order route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use sillage_core::inventory::StockReduction;
use sillage_core::order::OrderWithItems;
use sillage_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::{InventoryService, OrderService};
use crate::state::AppState;

/// Body for a status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// GET /api/orders
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    _: RequireAdmin,
) -> Result<Json<Arc<Vec<OrderWithItems>>>> {
    Ok(Json(state.views().orders(&state.store()).await?))
}

/// POST /api/orders/{id}/status
///
/// Moving an order to `delivered` also reduces stock.
#[instrument(skip(state, request), fields(order_id = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    _: RequireAdmin,
    Path(id): Path<OrderId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<OrderWithItems>> {
    let status: OrderStatus = request.status.parse().map_err(AppError::BadRequest)?;

    let store = state.store();
    let order = OrderService::new(&store, state.views())
        .advance_status(id, status)
        .await?;
    Ok(Json(order))
}

/// POST /api/orders/{id}/reduce-stock
///
/// Reduces stock without touching the order status.
#[instrument(skip(state), fields(order_id = %id))]
pub async fn reduce_stock(
    State(state): State<AppState>,
    _: RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<Vec<StockReduction>>> {
    let store = state.store();
    let reductions = InventoryService::new(&store, state.views())
        .reduce_for_order(id)
        .await?;
    Ok(Json(reductions))
}
