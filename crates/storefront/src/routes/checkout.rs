//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use sillage_core::order::OrderWithItems;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::place_order;
use crate::state::AppState;

/// POST /api/checkout
///
/// Creates an order from the account cart. Payment happens on the hosted
/// payment page the client opens next.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<OrderWithItems>)> {
    let order = place_order(state.pool(), state.signals(), user.id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}
