//! Account route handlers (require sign-in).

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use sillage_core::OrderId;
use sillage_core::order::{Order, OrderWithItems};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// GET /api/account
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool()).get_user(user.id).await?;
    Ok(Json(user))
}

/// GET /api/account/orders
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// GET /api/account/orders/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    OrderRepository::new(state.pool())
        .get_for_user(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
}
