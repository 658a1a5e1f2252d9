//! Cart-count signal.
//!
//! Every cart mutation publishes the owner's new item count here. Views that
//! show a cart badge subscribe (through `GET /api/cart/events`) and always
//! see the latest value: a `watch` channel keeps the most recent count, so a
//! subscriber that attaches after the mutation still observes it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use sillage_core::UserId;

/// Whose cart a signal refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CartOwner {
    /// Signed-in account cart.
    Account(UserId),
    /// Session-scoped guest cart, keyed by the session's guest key.
    Guest(Uuid),
}

/// Reactive per-owner cart counts.
#[derive(Clone, Default)]
pub struct CartSignals {
    channels: Arc<Mutex<HashMap<CartOwner, watch::Sender<u32>>>>,
}

impl CartSignals {
    /// Create an empty signal registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `count` as the owner's current cart count.
    ///
    /// The owner's channel is created if needed and always holds the latest
    /// published count, so a subscriber that attaches after this call sees
    /// it even if it read an older count beforehand. Other owners' channels
    /// without receivers are dropped.
    pub fn publish(&self, owner: CartOwner, count: u32) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.retain(|key, sender| *key == owner || sender.receiver_count() > 0);

        channels
            .entry(owner)
            .or_insert_with(|| watch::channel(count).0)
            .send_replace(count);
        tracing::debug!(?owner, count, "cart count published");
    }

    /// Subscribe to the owner's cart count.
    ///
    /// `current` seeds the channel only when nothing has been published for
    /// the owner; an existing channel already holds a newer or equal count.
    #[must_use]
    pub fn subscribe(&self, owner: CartOwner, current: u32) -> watch::Receiver<u32> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(owner)
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }

    /// Number of owners with at least one live subscriber.
    #[must_use]
    pub fn active_owners(&self) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|sender| sender.receiver_count() > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_late_subscriber_sees_latest_count() {
        let signals = CartSignals::new();
        let owner = CartOwner::Account(UserId::new(1));

        let mut first = signals.subscribe(owner, 0);
        signals.publish(owner, 3);
        signals.publish(owner, 5);

        let late = signals.subscribe(owner, 0);
        assert_eq!(*late.borrow(), 5);

        assert!(first.has_changed().unwrap_or(false));
        assert_eq!(*first.borrow_and_update(), 5);
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let signals = CartSignals::new();
        let alice = CartOwner::Account(UserId::new(1));
        let guest = CartOwner::Guest(Uuid::new_v4());

        let alice_rx = signals.subscribe(alice, 2);
        let guest_rx = signals.subscribe(guest, 0);
        signals.publish(guest, 4);

        assert_eq!(*alice_rx.borrow(), 2);
        assert_eq!(*guest_rx.borrow(), 4);
    }

    #[tokio::test]
    async fn test_subscriber_sees_count_published_after_its_read() {
        let signals = CartSignals::new();
        let owner = CartOwner::Guest(Uuid::new_v4());

        let read_before_mutation = 2;
        signals.publish(owner, 5);
        let rx = signals.subscribe(owner, read_before_mutation);

        assert_eq!(*rx.borrow(), 5);
    }

    #[tokio::test]
    async fn test_unsubscribed_channels_of_other_owners_are_pruned() {
        let signals = CartSignals::new();
        let first = CartOwner::Account(UserId::new(9));
        let second = CartOwner::Account(UserId::new(10));

        let rx = signals.subscribe(first, 1);
        assert_eq!(signals.active_owners(), 1);
        drop(rx);

        signals.publish(first, 2);
        assert_eq!(signals.active_owners(), 0);
        assert_eq!(*signals.subscribe(first, 7).borrow(), 2);

        signals.publish(second, 4);
        let channels = signals.channels.lock().unwrap_or_else(PoisonError::into_inner);
        assert!(channels.contains_key(&second));
        assert!(!channels.contains_key(&first));
    }
}
