//! Account cart operations, sign-in reconciliation and duplicate cleanup.
//!
//! The `cart` table does not enforce one row per (user, perfume). Rows are
//! kept unique by convention: [`CartService::add_item`] increments an existing
//! row, and [`CartService::remove_duplicates`] collapses any duplicates that
//! slip through (concurrent adds, merges from another device). Every mutation
//! publishes the owner's new item count on [`CartSignals`].

use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use sillage_core::cart::{self, CartLine, DuplicateGroup, LocalCart};
use sillage_core::{CartLineId, PerfumeId, Quantity, UserId};

use crate::db::RepositoryError;
use crate::signals::{CartOwner, CartSignals};

/// Remote cart accessor.
///
/// Implemented over `PostgreSQL` by [`crate::db::CartRepository`].
pub trait CartStore: Send + Sync {
    /// All cart rows for `owner`, ordered by row id.
    fn lines(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<CartLine>, RepositoryError>> + Send;

    /// Insert a new row.
    fn insert_line(
        &self,
        owner: UserId,
        perfume_id: PerfumeId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<CartLine, RepositoryError>> + Send;

    /// Overwrite one row's quantity.
    fn set_line_quantity(
        &self,
        line: CartLineId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete one row.
    fn delete_line(
        &self,
        line: CartLineId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete `removed` and set `survivor` to `quantity` as one unit of work.
    fn collapse_lines(
        &self,
        survivor: CartLineId,
        removed: &[CartLineId],
        quantity: Quantity,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete every row for `owner`.
    fn clear(&self, owner: UserId) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("perfume {0} is not in the cart")]
    NotInCart(PerfumeId),
}

/// Outcome of merging a guest cart into an account cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Perfumes inserted into the account cart.
    pub inserted: Vec<PerfumeId>,
    /// Perfumes already present remotely; their local quantity was dropped.
    pub skipped: Vec<PerfumeId>,
    /// Perfumes whose insert failed.
    pub failed: Vec<PerfumeId>,
}

impl MergeReport {
    /// Whether any insert failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Outcome of a duplicate cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub groups_collapsed: usize,
    pub rows_removed: usize,
}

/// Cart operations for one store and signal registry.
pub struct CartService<'a, S> {
    store: &'a S,
    signals: &'a CartSignals,
}

impl<'a, S: CartStore> CartService<'a, S> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: &'a S, signals: &'a CartSignals) -> Self {
        Self { store, signals }
    }

    /// Current rows for `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be fetched.
    pub async fn lines(&self, owner: UserId) -> Result<Vec<CartLine>, CartError> {
        Ok(self.store.lines(owner).await?)
    }

    /// Sum of quantities in the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be fetched.
    pub async fn count(&self, owner: UserId) -> Result<u32, CartError> {
        let lines = self.store.lines(owner).await?;
        Ok(cart::item_count(&lines))
    }

    /// Add `quantity` units of a perfume, incrementing an existing row if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects a read or write.
    #[instrument(skip(self), fields(owner = %owner, perfume_id = %perfume_id))]
    pub async fn add_item(
        &self,
        owner: UserId,
        perfume_id: PerfumeId,
        quantity: Quantity,
    ) -> Result<CartLine, CartError> {
        let lines = self.store.lines(owner).await?;

        let line = match lines.into_iter().find(|l| l.perfume_id == perfume_id) {
            Some(existing) => {
                let quantity = existing.quantity.saturating_add(quantity);
                self.store.set_line_quantity(existing.id, quantity).await?;
                CartLine {
                    quantity,
                    ..existing
                }
            }
            None => self.store.insert_line(owner, perfume_id, quantity).await?,
        };

        self.notify(owner).await;
        Ok(line)
    }

    /// Set the quantity for a perfume already in the cart.
    ///
    /// Duplicate rows for the perfume are folded into the first one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the perfume has no row.
    #[instrument(skip(self), fields(owner = %owner, perfume_id = %perfume_id))]
    pub async fn set_quantity(
        &self,
        owner: UserId,
        perfume_id: PerfumeId,
        quantity: Quantity,
    ) -> Result<(), CartError> {
        let lines = self.store.lines(owner).await?;
        let mut rows = lines
            .iter()
            .filter(|l| l.perfume_id == perfume_id)
            .map(|l| l.id);

        let Some(first) = rows.next() else {
            return Err(CartError::NotInCart(perfume_id));
        };
        let rest: Vec<CartLineId> = rows.collect();

        if rest.is_empty() {
            self.store.set_line_quantity(first, quantity).await?;
        } else {
            self.store.collapse_lines(first, &rest, quantity).await?;
        }

        self.notify(owner).await;
        Ok(())
    }

    /// Remove every row for a perfume.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the perfume has no row.
    #[instrument(skip(self), fields(owner = %owner, perfume_id = %perfume_id))]
    pub async fn remove_item(&self, owner: UserId, perfume_id: PerfumeId) -> Result<(), CartError> {
        let lines = self.store.lines(owner).await?;
        let ids: Vec<CartLineId> = lines
            .iter()
            .filter(|l| l.perfume_id == perfume_id)
            .map(|l| l.id)
            .collect();

        if ids.is_empty() {
            return Err(CartError::NotInCart(perfume_id));
        }
        for id in ids {
            self.store.delete_line(id).await?;
        }

        self.notify(owner).await;
        Ok(())
    }

    /// Empty the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn clear(&self, owner: UserId) -> Result<(), CartError> {
        self.store.clear(owner).await?;
        self.signals.publish(CartOwner::Account(owner), 0);
        Ok(())
    }

    /// Merge a guest cart into the owner's account cart.
    ///
    /// Perfumes already in the account cart are skipped; their local quantity
    /// is dropped. A failed insert is recorded and the merge moves on. Once the
    /// remote cart has been read, `local` is cleared whatever the outcome of
    /// the inserts; if the read fails, `local` is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error only if the account cart cannot be read.
    #[instrument(skip(self, local), fields(owner = %owner, local_lines = local.lines().len()))]
    pub async fn reconcile(
        &self,
        owner: UserId,
        local: &mut LocalCart,
    ) -> Result<MergeReport, CartError> {
        if local.is_empty() {
            return Ok(MergeReport::default());
        }

        let remote = self.store.lines(owner).await?;
        let to_merge = cart::lines_to_merge(local, &remote);

        let mut report = MergeReport {
            skipped: local
                .lines()
                .iter()
                .map(|l| l.perfume_id)
                .filter(|id| !to_merge.iter().any(|m| m.perfume_id == *id))
                .collect(),
            ..MergeReport::default()
        };

        for line in to_merge {
            match self
                .store
                .insert_line(owner, line.perfume_id, line.quantity)
                .await
            {
                Ok(_) => report.inserted.push(line.perfume_id),
                Err(e) => {
                    tracing::warn!(
                        perfume_id = %line.perfume_id,
                        error = %e,
                        "failed to merge guest cart line"
                    );
                    report.failed.push(line.perfume_id);
                }
            }
        }

        local.clear();
        self.notify(owner).await;

        tracing::info!(
            inserted = report.inserted.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "guest cart merged"
        );
        Ok(report)
    }

    /// Fetch the owner's rows and collapse duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be fetched or a collapse fails.
    pub async fn remove_duplicates(&self, owner: UserId) -> Result<CleanupReport, CartError> {
        let lines = self.store.lines(owner).await?;
        self.collapse_duplicates(&lines).await
    }

    /// Collapse every group of rows sharing a perfume into its first row.
    ///
    /// The survivor keeps its id and takes the group's summed quantity; the
    /// other rows are deleted. Each group is collapsed independently, so a
    /// failure leaves earlier groups collapsed and later ones untouched.
    ///
    /// # Errors
    ///
    /// Returns the first collapse failure.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn collapse_duplicates(&self, lines: &[CartLine]) -> Result<CleanupReport, CartError> {
        let mut report = CleanupReport::default();

        for DuplicateGroup {
            perfume_id,
            survivor,
            removed,
            total,
        } in cart::duplicate_groups(lines)
        {
            self.store
                .collapse_lines(survivor, &removed, total)
                .await
                .inspect_err(|e| {
                    tracing::error!(%perfume_id, %survivor, error = %e, "failed to collapse duplicate cart rows");
                })?;

            report.groups_collapsed += 1;
            report.rows_removed += removed.len();
        }

        if report.groups_collapsed > 0 {
            tracing::info!(
                groups = report.groups_collapsed,
                rows_removed = report.rows_removed,
                "collapsed duplicate cart rows"
            );
        }
        Ok(report)
    }

    /// Publish the owner's current count.
    ///
    /// A failed read is logged; the signal keeps its previous value.
    pub async fn notify(&self, owner: UserId) {
        match self.store.lines(owner).await {
            Ok(lines) => self
                .signals
                .publish(CartOwner::Account(owner), cart::item_count(&lines)),
            Err(e) => tracing::warn!(%owner, error = %e, "failed to refresh cart count"),
        }
    }

    /// Publish the owner's account count on the guest channel they signed in from.
    ///
    /// Badges subscribed before sign-in listen on the guest channel; after the
    /// guest cart is merged and cleared they follow the account cart.
    pub async fn notify_guest(&self, guest: Uuid, owner: UserId) {
        match self.store.lines(owner).await {
            Ok(lines) => self
                .signals
                .publish(CartOwner::Guest(guest), cart::item_count(&lines)),
            Err(e) => tracing::warn!(%owner, error = %e, "failed to refresh guest cart count"),
        }
    }
}
