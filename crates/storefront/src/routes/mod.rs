//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Database reachability
//!
//! # Catalog
//! GET    /api/perfumes                 - Listing (?q=&limit=&offset=)
//! GET    /api/perfumes/{id}            - Detail with images
//!
//! # Cart (guest or account)
//! GET    /api/cart                     - Cart view
//! DELETE /api/cart                     - Clear
//! POST   /api/cart/items               - Add {perfume_id, quantity}
//! PUT    /api/cart/items/{perfume_id}  - Set quantity {quantity}
//! DELETE /api/cart/items/{perfume_id}  - Remove
//! GET    /api/cart/count               - Badge count
//! GET    /api/cart/events              - SSE stream of cart-count events
//!
//! # Auth
//! POST   /api/auth/register            - Register, sign in, merge guest cart
//! POST   /api/auth/login               - Sign in, merge guest cart
//! POST   /api/auth/logout              - Sign out
//!
//! # Account (requires auth)
//! GET    /api/account                  - Current user
//! GET    /api/account/orders           - Order history
//! GET    /api/account/orders/{id}      - Order detail
//! POST   /api/checkout                 - Place order from account cart
//! GET    /api/wishlist                 - Saved perfumes
//! POST   /api/wishlist                 - Save {perfume_id}
//! DELETE /api/wishlist/{perfume_id}    - Unsave
//!
//! # Newsletter
//! POST   /api/newsletter               - Subscribe {email}
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod newsletter;
pub mod wishlist;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{id}", get(catalog::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{perfume_id}",
            put(cart::update).delete(cart::remove),
        )
        .route("/count", get(cart::count))
        .route("/events", get(cart::events))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index).post(wishlist::add))
        .route("/{perfume_id}", delete(wishlist::remove))
}

/// Create all routes for the storefront.
///
/// The session layer is added by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/perfumes", catalog_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/auth", auth_routes())
        .nest("/api/account", account_routes())
        .route("/api/checkout", post(checkout::checkout))
        .nest("/api/wishlist", wishlist_routes())
        .route("/api/newsletter", post(newsletter::subscribe))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
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
