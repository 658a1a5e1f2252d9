//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness
//! GET    /health/ready                        - Database reachability
//!
//! # Auth
//! POST   /api/auth/login                      - Sign in {password}
//! POST   /api/auth/logout                     - Sign out
//!
//! # Inventory (requires auth)
//! GET    /api/inventory                       - Stock per perfume
//! GET    /api/inventory/summary               - Totals, low and out of stock
//! GET    /api/inventory/log                   - Recent manual adjustments
//! POST   /api/inventory/{perfume_id}/adjust   - Set stock {quantity, reason}
//!
//! # Orders (requires auth)
//! GET    /api/orders                          - Recent orders with items
//! POST   /api/orders/{id}/status              - Advance status {status}
//! POST   /api/orders/{id}/reduce-stock        - Reduce stock for an order
//! ```

pub mod auth;
pub mod inventory;
pub mod orders;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::index))
        .route("/summary", get(inventory::summary))
        .route("/log", get(inventory::log))
        .route("/{perfume_id}/adjust", post(inventory::adjust))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/reduce-stock", post(orders::reduce_stock))
}

/// Create all routes for the admin panel.
///
/// The session layer is added by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/auth", auth_routes())
        .nest("/api/inventory", inventory_routes())
        .nest("/api/orders", order_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
