//! Stock adjustments and the admin view cache.

#![allow(clippy::unwrap_used)]

use sillage_admin::db::RepositoryError;
use sillage_admin::services::{InventoryError, InventoryService, ViewCache, ViewKey};
use sillage_core::{OrderId, PerfumeId, UserId};
use sillage_integration_tests::MemoryStore;

const SHOPPER: UserId = UserId::new(1);

fn views() -> ViewCache {
    ViewCache::new(5, 50)
}

// =============================================================================
// Order-driven reduction
// =============================================================================

#[tokio::test]
async fn test_order_reduction_writes_no_log_entries() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 10);
    store.set_stock(2, 4);
    let order = store.add_order(SHOPPER, &[(1, 2), (2, 1)]);

    InventoryService::new(&store, &views)
        .reduce_for_order(order)
        .await
        .unwrap();

    assert_eq!(store.stock(1), Some(8));
    assert_eq!(store.stock(2), Some(3));
    assert!(store.log_entries().is_empty());
}

#[tokio::test]
async fn test_order_reduction_sums_repeated_perfume() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 10);
    let order = store.add_order(SHOPPER, &[(1, 2), (1, 3)]);

    let reductions = InventoryService::new(&store, &views)
        .reduce_for_order(order)
        .await
        .unwrap();

    assert_eq!(reductions.len(), 1);
    assert_eq!(store.stock(1), Some(5));
}

#[tokio::test]
async fn test_order_reduction_missing_record_changes_nothing() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 10);
    let order = store.add_order(SHOPPER, &[(1, 2), (77, 1)]);

    let result = InventoryService::new(&store, &views)
        .reduce_for_order(order)
        .await;

    assert!(matches!(
        result,
        Err(InventoryError::Repository(RepositoryError::MissingInventory(id))) if id == PerfumeId::new(77)
    ));
    assert_eq!(store.stock(1), Some(10));
    assert_eq!(store.stock(77), None);
}

#[tokio::test]
async fn test_order_reduction_unknown_order() {
    let store = MemoryStore::new();
    let views = views();

    let result = InventoryService::new(&store, &views)
        .reduce_for_order(OrderId::new(404))
        .await;

    assert!(matches!(result, Err(InventoryError::OrderNotFound(id)) if id == OrderId::new(404)));
}

#[tokio::test]
async fn test_order_reduction_may_go_negative() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 1);
    let order = store.add_order(SHOPPER, &[(1, 3)]);

    InventoryService::new(&store, &views)
        .reduce_for_order(order)
        .await
        .unwrap();

    assert_eq!(store.stock(1), Some(-2));
}

// =============================================================================
// Manual adjustment
// =============================================================================

#[tokio::test]
async fn test_manual_adjustment_sets_quantity_and_logs() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 10);

    let entry = InventoryService::new(&store, &views)
        .adjust_manually(PerfumeId::new(1), 4, "damaged stock")
        .await
        .unwrap();

    assert_eq!(store.stock(1), Some(4));
    let log = store.log_entries();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0], entry);
    assert_eq!(entry.old_quantity, 10);
    assert_eq!(entry.new_quantity, 4);
    assert_eq!(entry.reason, "damaged stock");
}

#[tokio::test]
async fn test_manual_adjustment_without_record_starts_from_zero() {
    let store = MemoryStore::new();
    let views = views();

    let entry = InventoryService::new(&store, &views)
        .adjust_manually(PerfumeId::new(9), 12, "initial count")
        .await
        .unwrap();

    assert_eq!(entry.old_quantity, 0);
    assert_eq!(store.stock(9), Some(12));
}

#[tokio::test]
async fn test_manual_adjustment_blank_reason_rejected_before_write() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 10);

    let result = InventoryService::new(&store, &views)
        .adjust_manually(PerfumeId::new(1), 4, "   ")
        .await;

    assert!(matches!(result, Err(InventoryError::BlankReason)));
    assert_eq!(store.stock(1), Some(10));
    assert!(store.log_entries().is_empty());
}

#[tokio::test]
async fn test_manual_adjustment_accepts_negative_quantity() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 2);

    InventoryService::new(&store, &views)
        .adjust_manually(PerfumeId::new(1), -3, "backorder")
        .await
        .unwrap();

    assert_eq!(store.stock(1), Some(-3));
}

// =============================================================================
// View cache
// =============================================================================

#[tokio::test]
async fn test_views_reflect_manual_adjustment() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 10);
    store.set_stock(2, 3);

    let before = views.summary(&store).await.unwrap();
    assert_eq!(before.low_stock, 1);
    assert_eq!(before.out_of_stock, 0);

    InventoryService::new(&store, &views)
        .adjust_manually(PerfumeId::new(1), 0, "stocktake")
        .await
        .unwrap();

    let summary = views.summary(&store).await.unwrap();
    assert_eq!(summary.out_of_stock, 1);
    let inventory = views.inventory(&store).await.unwrap();
    assert_eq!(inventory[0].quantity, 0);
    let log = views.log(&store).await.unwrap();
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_views_are_cached_until_refresh() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 10);

    views.inventory(&store).await.unwrap();
    assert!(views.contains(ViewKey::InventoryList));

    // Written behind the service's back: the cached view is stale.
    store.set_stock(1, 2);
    assert_eq!(views.inventory(&store).await.unwrap()[0].quantity, 10);

    views.refresh(&store).await;
    assert_eq!(views.inventory(&store).await.unwrap()[0].quantity, 2);
}

#[tokio::test]
async fn test_failed_refresh_leaves_views_empty() {
    let store = MemoryStore::new();
    let views = views();
    store.set_stock(1, 10);
    views.inventory(&store).await.unwrap();

    store.fail_fetch(true);
    views.refresh(&store).await;
    for key in ViewKey::ALL {
        assert!(!views.contains(key));
    }

    store.fail_fetch(false);
    assert_eq!(views.inventory(&store).await.unwrap().len(), 1);
}
