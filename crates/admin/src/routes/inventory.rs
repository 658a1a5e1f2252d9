//! Inventory route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use sillage_core::PerfumeId;
use sillage_core::inventory::{InventoryLogEntry, InventoryRecord, InventorySummary};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::services::InventoryService;
use crate::state::AppState;

/// Body for a manual stock adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    /// New absolute stock count.
    pub quantity: i32,
    pub reason: String,
}

/// GET /api/inventory
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    _: RequireAdmin,
) -> Result<Json<Arc<Vec<InventoryRecord>>>> {
    Ok(Json(state.views().inventory(&state.store()).await?))
}

/// GET /api/inventory/summary
#[instrument(skip_all)]
pub async fn summary(
    State(state): State<AppState>,
    _: RequireAdmin,
) -> Result<Json<InventorySummary>> {
    Ok(Json(state.views().summary(&state.store()).await?))
}

/// GET /api/inventory/log
#[instrument(skip_all)]
pub async fn log(
    State(state): State<AppState>,
    _: RequireAdmin,
) -> Result<Json<Arc<Vec<InventoryLogEntry>>>> {
    Ok(Json(state.views().log(&state.store()).await?))
}

/// POST /api/inventory/{perfume_id}/adjust
#[instrument(skip(state, request), fields(perfume_id = %perfume_id))]
pub async fn adjust(
    State(state): State<AppState>,
    _: RequireAdmin,
    Path(perfume_id): Path<PerfumeId>,
    Json(request): Json<AdjustRequest>,
) -> Result<Json<InventoryLogEntry>> {
    let store = state.store();
    let entry = InventoryService::new(&store, state.views())
        .adjust_manually(perfume_id, request.quantity, &request.reason)
        .await?;
    Ok(Json(entry))
}
