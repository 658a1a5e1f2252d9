//! Duplicate cart-row cleanup.

#![allow(clippy::unwrap_used)]

use sillage_core::{PerfumeId, Quantity, UserId};
use sillage_integration_tests::MemoryStore;
use sillage_storefront::services::{CartError, CartService, CleanupReport};
use sillage_storefront::signals::CartSignals;

const OWNER: UserId = UserId::new(3);

#[tokio::test]
async fn test_cleanup_collapses_each_group_into_first_row() {
    let store = MemoryStore::new();
    let signals = CartSignals::new();
    let first = store.push_cart_line(OWNER, 1, 2);
    store.push_cart_line(OWNER, 2, 1);
    store.push_cart_line(OWNER, 1, 3);
    store.push_cart_line(OWNER, 1, 1);

    let report = CartService::new(&store, &signals)
        .remove_duplicates(OWNER)
        .await
        .unwrap();

    assert_eq!(
        report,
        CleanupReport {
            groups_collapsed: 1,
            rows_removed: 2
        }
    );
    let lines = store.cart_lines(OWNER);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].id, first);
    assert_eq!(lines[0].quantity, Quantity::new(6).unwrap());
    assert_eq!(store.cart_pairs(OWNER), vec![(1, 6), (2, 1)]);
}

#[tokio::test]
async fn test_cleanup_without_duplicates_makes_no_writes() {
    let store = MemoryStore::new();
    let signals = CartSignals::new();
    store.push_cart_line(OWNER, 1, 1);
    store.push_cart_line(OWNER, 2, 4);

    let report = CartService::new(&store, &signals)
        .remove_duplicates(OWNER)
        .await
        .unwrap();

    assert_eq!(report, CleanupReport::default());
    assert_eq!(store.collapse_calls(), 0);
    assert_eq!(store.cart_pairs(OWNER), vec![(1, 1), (2, 4)]);
}

#[tokio::test]
async fn test_cleanup_of_empty_cart_is_noop() {
    let store = MemoryStore::new();
    let signals = CartSignals::new();

    let report = CartService::new(&store, &signals)
        .remove_duplicates(OWNER)
        .await
        .unwrap();

    assert_eq!(report, CleanupReport::default());
    assert_eq!(store.collapse_calls(), 0);
}

#[tokio::test]
async fn test_cleanup_leaves_other_owners_alone() {
    let store = MemoryStore::new();
    let signals = CartSignals::new();
    let other = UserId::new(99);
    store.push_cart_line(other, 1, 1);
    store.push_cart_line(other, 1, 1);
    store.push_cart_line(OWNER, 1, 1);

    CartService::new(&store, &signals)
        .remove_duplicates(OWNER)
        .await
        .unwrap();

    assert_eq!(store.cart_lines(other).len(), 2);
}

#[tokio::test]
async fn test_cleanup_stops_at_failed_group() {
    let store = MemoryStore::new();
    let signals = CartSignals::new();
    store.push_cart_line(OWNER, 1, 1);
    store.push_cart_line(OWNER, 1, 1);
    let failing = store.push_cart_line(OWNER, 2, 1);
    store.push_cart_line(OWNER, 2, 1);
    store.fail_collapse_into(failing);

    let result = CartService::new(&store, &signals)
        .remove_duplicates(OWNER)
        .await;

    assert!(matches!(result, Err(CartError::Repository(_))));
    // The first group was collapsed before the failure.
    assert_eq!(store.cart_pairs(OWNER), vec![(1, 2), (2, 1), (2, 1)]);
}

// =============================================================================
// Row-level operations keep one row per perfume
// =============================================================================

#[tokio::test]
async fn test_add_item_increments_existing_row() {
    let store = MemoryStore::new();
    let signals = CartSignals::new();
    let service = CartService::new(&store, &signals);

    service
        .add_item(OWNER, PerfumeId::new(4), Quantity::ONE)
        .await
        .unwrap();
    service
        .add_item(OWNER, PerfumeId::new(4), Quantity::new(2).unwrap())
        .await
        .unwrap();

    assert_eq!(store.cart_pairs(OWNER), vec![(4, 3)]);
    assert_eq!(service.count(OWNER).await.unwrap(), 3);
}

#[tokio::test]
async fn test_set_quantity_folds_duplicates() {
    let store = MemoryStore::new();
    let signals = CartSignals::new();
    store.push_cart_line(OWNER, 4, 1);
    store.push_cart_line(OWNER, 4, 2);

    CartService::new(&store, &signals)
        .set_quantity(OWNER, PerfumeId::new(4), Quantity::new(5).unwrap())
        .await
        .unwrap();

    assert_eq!(store.cart_pairs(OWNER), vec![(4, 5)]);
}

#[tokio::test]
async fn test_remove_item_not_in_cart() {
    let store = MemoryStore::new();
    let signals = CartSignals::new();

    let result = CartService::new(&store, &signals)
        .remove_item(OWNER, PerfumeId::new(8))
        .await;

    assert!(matches!(result, Err(CartError::NotInCart(id)) if id == PerfumeId::new(8)));
}
