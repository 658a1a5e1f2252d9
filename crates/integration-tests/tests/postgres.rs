//! Transactional repository writes against a real `PostgreSQL` database.
//!
//! These tests are ignored by default. Run them with:
//!
//! ```bash
//! SILLAGE_TEST_DATABASE_URL=postgres://localhost/sillage_test \
//!     cargo test -p sillage-integration-tests --test postgres -- --ignored
//! ```
//!
//! Each test creates its own user and perfumes, so they can share a database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use sillage_admin::db::{InventoryRepository, OrderRepository as AdminOrderRepository};
use sillage_core::inventory::StockReduction;
use sillage_core::order::{NewOrderItem, OrderItem};
use sillage_core::{CartLineId, OrderStatus, PerfumeId, Quantity, UserId};
use sillage_storefront::db::{CartRepository, OrderRepository};
use sillage_storefront::services::CartStore;

async fn pool() -> PgPool {
    let url = std::env::var("SILLAGE_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("SILLAGE_TEST_DATABASE_URL or DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("connect to test database");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

async fn create_user(pool: &PgPool) -> UserId {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash) VALUES ($1, 'x') RETURNING id",
    )
    .bind(format!("{}@example.com", Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .unwrap();
    UserId::new(id)
}

async fn create_perfume(pool: &PgPool, price: Decimal) -> PerfumeId {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO perfumes (name, display_price, price) VALUES ($1, '£85', $2) RETURNING id",
    )
    .bind(format!("Perfume {}", Uuid::new_v4()))
    .bind(price)
    .fetch_one(pool)
    .await
    .unwrap();
    PerfumeId::new(id)
}

async fn set_stock(pool: &PgPool, perfume_id: PerfumeId, quantity: i32) {
    sqlx::query("INSERT INTO inventory (perfume_id, quantity) VALUES ($1, $2)")
        .bind(perfume_id)
        .bind(quantity)
        .execute(pool)
        .await
        .unwrap();
}

async fn stock(pool: &PgPool, perfume_id: PerfumeId) -> Option<i32> {
    sqlx::query_scalar("SELECT quantity FROM inventory WHERE perfume_id = $1")
        .bind(perfume_id)
        .fetch_optional(pool)
        .await
        .unwrap()
}

fn qty(n: i32) -> Quantity {
    Quantity::new(n).unwrap()
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
#[ignore = "Requires database"]
async fn test_collapse_lines_merges_rows_into_survivor() {
    let pool = pool().await;
    let owner = create_user(&pool).await;
    let perfume = create_perfume(&pool, Decimal::new(8500, 2)).await;
    let carts = CartRepository::new(&pool);

    let first = carts.insert_line(owner, perfume, qty(1)).await.unwrap();
    let second = carts.insert_line(owner, perfume, qty(2)).await.unwrap();

    carts
        .collapse_lines(first.id, &[second.id], qty(3))
        .await
        .unwrap();

    let lines = carts.lines(owner).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].id, first.id);
    assert_eq!(lines[0].quantity.get(), 3);
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_failed_collapse_leaves_rows_untouched() {
    let pool = pool().await;
    let owner = create_user(&pool).await;
    let perfume = create_perfume(&pool, Decimal::new(8500, 2)).await;
    let carts = CartRepository::new(&pool);

    let first = carts.insert_line(owner, perfume, qty(1)).await.unwrap();
    let second = carts.insert_line(owner, perfume, qty(2)).await.unwrap();
    let missing_survivor = CartLineId::new(i32::MAX);

    let result = carts
        .collapse_lines(missing_survivor, &[first.id, second.id], qty(3))
        .await;

    assert!(result.is_err());
    let quantities: Vec<i32> = carts
        .lines(owner)
        .await
        .unwrap()
        .iter()
        .map(|l| l.quantity.get())
        .collect();
    assert_eq!(quantities, vec![1, 2]);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
#[ignore = "Requires database"]
async fn test_order_total_is_sum_of_item_subtotals() {
    let pool = pool().await;
    let owner = create_user(&pool).await;
    let rose = create_perfume(&pool, Decimal::new(8500, 2)).await;
    let oud = create_perfume(&pool, Decimal::new(12050, 2)).await;
    let carts = CartRepository::new(&pool);
    let rose_line = carts.insert_line(owner, rose, qty(2)).await.unwrap();
    let oud_line = carts.insert_line(owner, oud, qty(1)).await.unwrap();

    let items = [
        NewOrderItem {
            perfume_id: rose,
            quantity: qty(2),
            unit_price: Decimal::new(8500, 2),
        },
        NewOrderItem {
            perfume_id: oud,
            quantity: qty(1),
            unit_price: Decimal::new(12050, 2),
        },
    ];

    let order = OrderRepository::new(&pool)
        .create_from_cart(owner, &[rose_line.id, oud_line.id], &items)
        .await
        .unwrap();

    let subtotals: Decimal = order.items.iter().map(OrderItem::subtotal).sum();
    assert_eq!(order.order.total, subtotals);
    assert_eq!(order.order.total, Decimal::new(29050, 2));
    assert_eq!(order.order.status, OrderStatus::Processing);
    assert!(carts.lines(owner).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_checkout_keeps_cart_rows_added_after_pricing() {
    let pool = pool().await;
    let owner = create_user(&pool).await;
    let rose = create_perfume(&pool, Decimal::new(8500, 2)).await;
    let iris = create_perfume(&pool, Decimal::new(9000, 2)).await;
    let carts = CartRepository::new(&pool);
    let priced = carts.insert_line(owner, rose, qty(1)).await.unwrap();
    let items = [NewOrderItem {
        perfume_id: rose,
        quantity: qty(1),
        unit_price: Decimal::new(8500, 2),
    }];

    let late = carts.insert_line(owner, iris, qty(4)).await.unwrap();
    OrderRepository::new(&pool)
        .create_from_cart(owner, &[priced.id], &items)
        .await
        .unwrap();

    let remaining = carts.lines(owner).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, late.id);
}

// =============================================================================
// Inventory and delivery
// =============================================================================

#[tokio::test]
#[ignore = "Requires database"]
async fn test_reductions_roll_back_on_missing_inventory() {
    let pool = pool().await;
    let stocked = create_perfume(&pool, Decimal::new(8500, 2)).await;
    let unstocked = create_perfume(&pool, Decimal::new(8500, 2)).await;
    set_stock(&pool, stocked, 10).await;

    let result = InventoryRepository::new(&pool)
        .apply_reductions(&[
            StockReduction {
                perfume_id: stocked,
                quantity: 3,
            },
            StockReduction {
                perfume_id: unstocked,
                quantity: 1,
            },
        ])
        .await;

    assert!(matches!(
        result,
        Err(sillage_admin::db::RepositoryError::MissingInventory(id)) if id == unstocked
    ));
    assert_eq!(stock(&pool, stocked).await, Some(10));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_manual_adjustment_logs_old_and_new_quantity() {
    let pool = pool().await;
    let perfume = create_perfume(&pool, Decimal::new(8500, 2)).await;
    let inventory = InventoryRepository::new(&pool);

    let first = inventory
        .set_quantity_logged(perfume, 12, "initial count")
        .await
        .unwrap();
    let second = inventory
        .set_quantity_logged(perfume, -1, "damaged in transit")
        .await
        .unwrap();

    assert_eq!((first.old_quantity, first.new_quantity), (0, 12));
    assert_eq!((second.old_quantity, second.new_quantity), (12, -1));
    assert_eq!(stock(&pool, perfume).await, Some(-1));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_delivering_twice_conflicts_and_reduces_once() {
    let pool = pool().await;
    let owner = create_user(&pool).await;
    let perfume = create_perfume(&pool, Decimal::new(8500, 2)).await;
    set_stock(&pool, perfume, 10).await;
    let order = OrderRepository::new(&pool)
        .create_from_cart(
            owner,
            &[],
            &[NewOrderItem {
                perfume_id: perfume,
                quantity: qty(2),
                unit_price: Decimal::new(8500, 2),
            }],
        )
        .await
        .unwrap();
    let reductions = [StockReduction {
        perfume_id: perfume,
        quantity: 2,
    }];
    let orders = AdminOrderRepository::new(&pool);

    orders.deliver(order.order.id, &reductions).await.unwrap();
    let again = orders.deliver(order.order.id, &reductions).await;

    assert!(matches!(
        again,
        Err(sillage_admin::db::RepositoryError::Conflict(_))
    ));
    assert_eq!(stock(&pool, perfume).await, Some(8));
    let stored = orders.get(order.order.id).await.unwrap().unwrap();
    assert_eq!(stored.order.status, OrderStatus::Delivered);
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_delivery_with_missing_inventory_keeps_status() {
    let pool = pool().await;
    let owner = create_user(&pool).await;
    let perfume = create_perfume(&pool, Decimal::new(8500, 2)).await;
    let order = OrderRepository::new(&pool)
        .create_from_cart(
            owner,
            &[],
            &[NewOrderItem {
                perfume_id: perfume,
                quantity: qty(1),
                unit_price: Decimal::new(8500, 2),
            }],
        )
        .await
        .unwrap();
    let orders = AdminOrderRepository::new(&pool);

    let result = orders
        .deliver(
            order.order.id,
            &[StockReduction {
                perfume_id: perfume,
                quantity: 1,
            }],
        )
        .await;

    assert!(matches!(
        result,
        Err(sillage_admin::db::RepositoryError::MissingInventory(_))
    ));
    let stored = orders.get(order.order.id).await.unwrap().unwrap();
    assert_eq!(stored.order.status, OrderStatus::Processing);
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_status_update_does_not_undo_delivery() {
    let pool = pool().await;
    let owner = create_user(&pool).await;
    let perfume = create_perfume(&pool, Decimal::new(8500, 2)).await;
    set_stock(&pool, perfume, 5).await;
    let order = OrderRepository::new(&pool)
        .create_from_cart(
            owner,
            &[],
            &[NewOrderItem {
                perfume_id: perfume,
                quantity: qty(1),
                unit_price: Decimal::new(8500, 2),
            }],
        )
        .await
        .unwrap();
    let orders = AdminOrderRepository::new(&pool);
    orders
        .deliver(
            order.order.id,
            &[StockReduction {
                perfume_id: perfume,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let result = orders
        .update_status(
            order.order.id,
            OrderStatus::Processing,
            OrderStatus::Dispatched,
        )
        .await;

    assert!(matches!(
        result,
        Err(sillage_admin::db::RepositoryError::Conflict(_))
    ));
    let stored = orders.get(order.order.id).await.unwrap().unwrap();
    assert_eq!(stored.order.status, OrderStatus::Delivered);
}

// =============================================================================
// Guest cart
// =============================================================================

#[tokio::test]
#[ignore = "Requires database"]
async fn test_guest_add_rejects_unknown_perfume() {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    let pool = pool().await;
    let state = sillage_integration_tests::storefront_state_with_pool(pool);
    let app = sillage_integration_tests::storefront_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/cart/items")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"perfume_id": 2147483647}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
