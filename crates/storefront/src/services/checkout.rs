//! Checkout: turn an account cart into an order.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use sillage_core::order::{NewOrderItem, OrderWithItems};
use sillage_core::{CartLineId, UserId};

use crate::db::{CartRepository, OrderRepository, RepositoryError};
use crate::services::cart::{CartError, CartService};
use crate::signals::CartSignals;

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Place an order for everything in the owner's cart.
///
/// Duplicate cart rows are collapsed first so each perfume becomes one order
/// item. The order, its items and the removal of the ordered cart rows are
/// written in one transaction; the cart signal is then republished.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if there is nothing to order.
#[instrument(skip(pool, signals), fields(owner = %owner))]
pub async fn place_order(
    pool: &PgPool,
    signals: &CartSignals,
    owner: UserId,
) -> Result<OrderWithItems, CheckoutError> {
    let carts = CartRepository::new(pool);
    let service = CartService::new(&carts, signals);
    service.remove_duplicates(owner).await?;

    let cart_items = carts.items_with_perfumes(owner).await?;
    let ordered_lines: Vec<CartLineId> =
        cart_items.iter().filter_map(|item| item.line_id).collect();
    let items: Vec<NewOrderItem> = cart_items
        .into_iter()
        .map(|item| NewOrderItem {
            perfume_id: item.perfume_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect();

    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let order = OrderRepository::new(pool)
        .create_from_cart(owner, &ordered_lines, &items)
        .await?;
    service.notify(owner).await;

    tracing::info!(
        order_id = %order.order.id,
        items = order.items.len(),
        total = %order.order.total,
        "order placed"
    );
    Ok(order)
}
