//! Cart route handlers.
//!
//! A signed-in shopper's cart lives in the `cart` table; everyone else gets a
//! guest cart held in the session. Both publish their item count on the cart
//! signal after every change.

use std::collections::HashMap;
use std::convert::Infallible;

use async_stream::stream;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sillage_core::cart::LocalCart;
use sillage_core::{PerfumeId, Quantity, UserId};

use crate::db::{CartRepository, PerfumeRepository};
use crate::error::{AppError, Result};
use crate::middleware::ShopperSession;
use crate::models::{CartItemView, CartView};
use crate::services::CartService;
use crate::signals::CartOwner;
use crate::state::AppState;

/// SSE event name for cart-count updates.
pub const CART_COUNT_EVENT: &str = "cart-count";

/// Body for adding an item.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub perfume_id: PerfumeId,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

/// Body for setting an item's quantity.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u32,
}

fn parse_quantity(value: i32) -> Result<Quantity> {
    Quantity::new(value).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// GET /api/cart
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: ShopperSession,
) -> Result<Json<CartView>> {
    let currency = state.config().currency;

    let items = match session.current_user().await? {
        Some(user) => account_items(&state, user.id).await?,
        None => guest_items(&state, &session.local_cart().await?).await?,
    };

    Ok(Json(CartView::new(items, currency)))
}

async fn account_items(state: &AppState, owner: UserId) -> Result<Vec<CartItemView>> {
    let carts = CartRepository::new(state.pool());
    CartService::new(&carts, state.signals())
        .remove_duplicates(owner)
        .await?;
    Ok(carts.items_with_perfumes(owner).await?)
}

async fn guest_items(state: &AppState, cart: &LocalCart) -> Result<Vec<CartItemView>> {
    let ids: Vec<PerfumeId> = cart.lines().iter().map(|l| l.perfume_id).collect();
    let mut perfumes: HashMap<PerfumeId, _> = PerfumeRepository::new(state.pool())
        .summaries(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    // Lines for perfumes that no longer exist are left out.
    Ok(cart
        .lines()
        .iter()
        .filter_map(|line| {
            let perfume = perfumes.remove(&line.perfume_id)?;
            Some(CartItemView {
                line_id: None,
                perfume_id: line.perfume_id,
                name: perfume.name,
                display_price: perfume.display_price,
                unit_price: perfume.price,
                quantity: line.quantity,
                image_url: perfume.image_url,
            })
        })
        .collect())
}

/// POST /api/cart/items
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: ShopperSession,
    Json(request): Json<AddItemRequest>,
) -> Result<impl IntoResponse> {
    let quantity = parse_quantity(request.quantity.unwrap_or(1))?;
    ensure_perfume_exists(&state, request.perfume_id).await?;

    let count = match session.current_user().await? {
        Some(user) => {
            let carts = CartRepository::new(state.pool());
            let service = CartService::new(&carts, state.signals());
            service.add_item(user.id, request.perfume_id, quantity).await?;
            service.count(user.id).await?
        }
        None => {
            let mut cart = session.local_cart().await?;
            cart.add(request.perfume_id, quantity);
            save_guest_cart(&state, &session, &cart).await?
        }
    };

    Ok((StatusCode::CREATED, Json(CountResponse { count })))
}

/// PUT /api/cart/items/{perfume_id}
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: ShopperSession,
    Path(perfume_id): Path<PerfumeId>,
    Json(request): Json<SetQuantityRequest>,
) -> Result<Json<CountResponse>> {
    let quantity = parse_quantity(request.quantity)?;

    let count = match session.current_user().await? {
        Some(user) => {
            let carts = CartRepository::new(state.pool());
            let service = CartService::new(&carts, state.signals());
            service.set_quantity(user.id, perfume_id, quantity).await?;
            service.count(user.id).await?
        }
        None => {
            let mut cart = session.local_cart().await?;
            if !cart.set_quantity(perfume_id, quantity) {
                return Err(AppError::NotFound("Cart item".to_string()));
            }
            save_guest_cart(&state, &session, &cart).await?
        }
    };

    Ok(Json(CountResponse { count }))
}

/// DELETE /api/cart/items/{perfume_id}
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: ShopperSession,
    Path(perfume_id): Path<PerfumeId>,
) -> Result<Json<CountResponse>> {
    let count = match session.current_user().await? {
        Some(user) => {
            let carts = CartRepository::new(state.pool());
            let service = CartService::new(&carts, state.signals());
            service.remove_item(user.id, perfume_id).await?;
            service.count(user.id).await?
        }
        None => {
            let mut cart = session.local_cart().await?;
            if !cart.remove(perfume_id) {
                return Err(AppError::NotFound("Cart item".to_string()));
            }
            save_guest_cart(&state, &session, &cart).await?
        }
    };

    Ok(Json(CountResponse { count }))
}

/// DELETE /api/cart
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: ShopperSession) -> Result<StatusCode> {
    match session.current_user().await? {
        Some(user) => {
            let carts = CartRepository::new(state.pool());
            CartService::new(&carts, state.signals())
                .clear(user.id)
                .await?;
        }
        None => {
            save_guest_cart(&state, &session, &LocalCart::new()).await?;
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/cart/count
#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    session: ShopperSession,
) -> Result<Json<CountResponse>> {
    let count = current_count(&state, &session).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/cart/events
///
/// Streams the caller's cart count. The first event carries the current
/// value; later events follow every change.
#[instrument(skip(state, session))]
pub async fn events(
    State(state): State<AppState>,
    session: ShopperSession,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let owner = session.cart_owner().await?;
    let current = current_count(&state, &session).await?;
    let mut updates = state.signals().subscribe(owner, current);

    let stream = stream! {
        loop {
            let count = *updates.borrow_and_update();
            yield Ok(Event::default().event(CART_COUNT_EVENT).data(count.to_string()));
            if updates.changed().await.is_err() {
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn current_count(state: &AppState, session: &ShopperSession) -> Result<u32> {
    match session.current_user().await? {
        Some(user) => {
            let carts = CartRepository::new(state.pool());
            Ok(CartService::new(&carts, state.signals())
                .count(user.id)
                .await?)
        }
        None => Ok(session.local_cart().await?.item_count()),
    }
}

/// Reject perfumes that are not in the catalog. Cached perfume details count
/// as proof of existence.
async fn ensure_perfume_exists(state: &AppState, perfume_id: PerfumeId) -> Result<()> {
    if state.perfume_cache().contains_key(&perfume_id) {
        return Ok(());
    }
    if PerfumeRepository::new(state.pool()).exists(perfume_id).await? {
        return Ok(());
    }
    Err(AppError::NotFound("Perfume".to_string()))
}

/// Store the guest cart and publish its count.
async fn save_guest_cart(
    state: &AppState,
    session: &ShopperSession,
    cart: &LocalCart,
) -> Result<u32> {
    session.save_local_cart(cart).await?;
    let count = cart.item_count();
    let key = session.guest_key().await?;
    state.signals().publish(CartOwner::Guest(key), count);
    Ok(count)
}
