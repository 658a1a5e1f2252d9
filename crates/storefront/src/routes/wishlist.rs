//! Wishlist route handlers (require sign-in).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use sillage_core::PerfumeId;

use crate::db::{PerfumeRepository, RepositoryError, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::WishlistItem;
use crate::state::AppState;

/// Body for saving a perfume.
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub perfume_id: PerfumeId,
}

/// GET /api/wishlist
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<WishlistItem>>> {
    Ok(Json(WishlistRepository::new(state.pool()).list(user.id).await?))
}

/// POST /api/wishlist
///
/// Saving a perfume twice is not an error.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<AddRequest>,
) -> Result<StatusCode> {
    if !PerfumeRepository::new(state.pool())
        .exists(request.perfume_id)
        .await?
    {
        return Err(AppError::NotFound("Perfume".to_string()));
    }

    let created = WishlistRepository::new(state.pool())
        .add(user.id, request.perfume_id)
        .await?;
    Ok(if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    })
}

/// DELETE /api/wishlist/{perfume_id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(perfume_id): Path<PerfumeId>,
) -> Result<StatusCode> {
    match WishlistRepository::new(state.pool())
        .remove(user.id, perfume_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound("Wishlist item".to_string())),
        Err(e) => Err(e.into()),
    }
}
