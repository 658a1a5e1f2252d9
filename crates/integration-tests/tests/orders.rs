//! Order status changes and delivery fulfilment.

#![allow(clippy::unwrap_used)]

use sillage_admin::db::RepositoryError;
use sillage_admin::services::{OrderError, OrderService, ViewCache};
use sillage_core::{OrderId, OrderStatus, UserId};
use sillage_integration_tests::MemoryStore;

const SHOPPER: UserId = UserId::new(1);

#[tokio::test]
async fn test_dispatch_does_not_touch_stock() {
    let store = MemoryStore::new();
    let views = ViewCache::new(5, 50);
    store.set_stock(1, 10);
    let order = store.add_order(SHOPPER, &[(1, 2)]);

    let updated = OrderService::new(&store, &views)
        .advance_status(order, OrderStatus::Dispatched)
        .await
        .unwrap();

    assert_eq!(updated.order.status, OrderStatus::Dispatched);
    assert_eq!(store.order_status(order), Some(OrderStatus::Dispatched));
    assert_eq!(store.stock(1), Some(10));
}

#[tokio::test]
async fn test_delivery_reduces_stock_once() {
    let store = MemoryStore::new();
    let views = ViewCache::new(5, 50);
    store.set_stock(1, 10);
    store.set_stock(2, 5);
    let order = store.add_order(SHOPPER, &[(1, 2), (2, 1)]);
    let service = OrderService::new(&store, &views);

    service
        .advance_status(order, OrderStatus::Dispatched)
        .await
        .unwrap();
    service
        .advance_status(order, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(store.stock(1), Some(8));
    assert_eq!(store.stock(2), Some(4));

    let again = service.advance_status(order, OrderStatus::Delivered).await;
    assert!(matches!(again, Err(OrderError::InvalidTransition { .. })));
    assert_eq!(store.stock(1), Some(8));
    assert!(store.log_entries().is_empty());
}

#[tokio::test]
async fn test_status_never_moves_backwards() {
    let store = MemoryStore::new();
    let views = ViewCache::new(5, 50);
    let order = store.add_order(SHOPPER, &[(1, 1)]);
    let service = OrderService::new(&store, &views);

    service
        .advance_status(order, OrderStatus::Dispatched)
        .await
        .unwrap();
    let result = service
        .advance_status(order, OrderStatus::Processing)
        .await;

    assert!(matches!(
        result,
        Err(OrderError::InvalidTransition {
            from: OrderStatus::Dispatched,
            to: OrderStatus::Processing
        })
    ));
    assert_eq!(store.order_status(order), Some(OrderStatus::Dispatched));
}

#[tokio::test]
async fn test_delivery_with_missing_stock_record_keeps_status() {
    let store = MemoryStore::new();
    let views = ViewCache::new(5, 50);
    store.set_stock(1, 10);
    let order = store.add_order(SHOPPER, &[(1, 2), (2, 1)]);

    let result = OrderService::new(&store, &views)
        .advance_status(order, OrderStatus::Delivered)
        .await;

    assert!(matches!(
        result,
        Err(OrderError::Repository(RepositoryError::MissingInventory(_)))
    ));
    assert_eq!(store.order_status(order), Some(OrderStatus::Processing));
    assert_eq!(store.stock(1), Some(10));
}

#[tokio::test]
async fn test_unknown_order() {
    let store = MemoryStore::new();
    let views = ViewCache::new(5, 50);

    let result = OrderService::new(&store, &views)
        .advance_status(OrderId::new(12), OrderStatus::Dispatched)
        .await;

    assert!(matches!(result, Err(OrderError::NotFound(_))));
}

#[tokio::test]
async fn test_order_view_reflects_status_change() {
    let store = MemoryStore::new();
    let views = ViewCache::new(5, 50);
    let order = store.add_order(SHOPPER, &[(1, 1)]);
    store.set_stock(1, 3);

    assert_eq!(
        views.orders(&store).await.unwrap()[0].order.status,
        OrderStatus::Processing
    );

    OrderService::new(&store, &views)
        .advance_status(order, OrderStatus::Delivered)
        .await
        .unwrap();

    assert_eq!(
        views.orders(&store).await.unwrap()[0].order.status,
        OrderStatus::Delivered
    );
}

#[tokio::test]
async fn test_dispatch_does_not_overwrite_concurrent_delivery() {
    let store = MemoryStore::new();
    let views = ViewCache::new(5, 50);
    store.set_stock(1, 10);
    let order = store.add_order(SHOPPER, &[(1, 2)]);
    store.change_status_after_read(order, OrderStatus::Delivered);

    let result = OrderService::new(&store, &views)
        .advance_status(order, OrderStatus::Dispatched)
        .await;

    assert!(matches!(
        result,
        Err(OrderError::Repository(RepositoryError::Conflict(_)))
    ));
    assert_eq!(store.order_status(order), Some(OrderStatus::Delivered));
}
