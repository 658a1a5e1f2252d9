//! Catalog route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::{debug, instrument};

use sillage_core::PerfumeId;

use crate::db::PerfumeRepository;
use crate::error::{AppError, Result};
use crate::models::{Perfume, PerfumeSummary};
use crate::state::AppState;

/// Default page size for catalog listings.
const DEFAULT_PAGE_SIZE: i64 = 24;

/// Query parameters for the catalog listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Matches perfume name or notes, case-insensitively.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/perfumes
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PerfumeSummary>>> {
    let perfumes = PerfumeRepository::new(state.pool())
        .list(
            query.q.as_deref(),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(perfumes))
}

/// GET /api/perfumes/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<PerfumeId>,
) -> Result<Json<Perfume>> {
    if let Some(perfume) = state.perfume_cache().get(&id).await {
        debug!("Cache hit for perfume");
        return Ok(Json(Perfume::clone(&perfume)));
    }

    let perfume = PerfumeRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Perfume".to_string()))?;

    state
        .perfume_cache()
        .insert(id, Arc::new(perfume.clone()))
        .await;

    Ok(Json(perfume))
}
