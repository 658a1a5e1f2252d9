//! Named view cache for the admin panel.
//!
//! Caches the four admin views using `moka`. Writes that change stock or
//! order state call [`ViewCache::refresh`], which drops every view and loads
//! it again, so the next read already sees the change.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use sillage_core::inventory::{InventoryLogEntry, InventoryRecord, InventorySummary};
use sillage_core::order::OrderWithItems;

use super::AdminStore;
use crate::db::RepositoryError;

/// Views go stale after this even without a refresh (orders arrive from the
/// storefront).
const VIEW_TTL: Duration = Duration::from_secs(60);

/// Cached admin views.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ViewKey {
    InventoryList,
    InventorySummary,
    InventoryLog,
    OrderList,
}

impl ViewKey {
    /// Every view, in refresh order.
    pub const ALL: [Self; 4] = [
        Self::InventoryList,
        Self::InventorySummary,
        Self::InventoryLog,
        Self::OrderList,
    ];
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum ViewValue {
    InventoryList(Arc<Vec<InventoryRecord>>),
    InventorySummary(InventorySummary),
    InventoryLog(Arc<Vec<InventoryLogEntry>>),
    OrderList(Arc<Vec<OrderWithItems>>),
}

/// Lazily loaded, explicitly refreshed admin views.
#[derive(Clone)]
pub struct ViewCache {
    cache: Cache<ViewKey, ViewValue>,
    low_stock_threshold: i32,
    log_page_size: i64,
}

impl ViewCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(low_stock_threshold: i32, log_page_size: i64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(ViewKey::ALL.len() as u64)
                .time_to_live(VIEW_TTL)
                .build(),
            low_stock_threshold,
            log_page_size,
        }
    }

    /// Whether a view is currently cached.
    #[must_use]
    pub fn contains(&self, key: ViewKey) -> bool {
        self.cache.contains_key(&key)
    }

    /// Inventory list view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view has to be loaded and the load fails.
    pub async fn inventory<S: AdminStore>(
        &self,
        store: &S,
    ) -> Result<Arc<Vec<InventoryRecord>>, RepositoryError> {
        match self.get_or_load(ViewKey::InventoryList, store).await? {
            ViewValue::InventoryList(records) => Ok(records),
            other => Err(mismatch(ViewKey::InventoryList, &other)),
        }
    }

    /// Inventory summary view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view has to be loaded and the load fails.
    pub async fn summary<S: AdminStore>(
        &self,
        store: &S,
    ) -> Result<InventorySummary, RepositoryError> {
        match self.get_or_load(ViewKey::InventorySummary, store).await? {
            ViewValue::InventorySummary(summary) => Ok(summary),
            other => Err(mismatch(ViewKey::InventorySummary, &other)),
        }
    }

    /// Inventory log view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view has to be loaded and the load fails.
    pub async fn log<S: AdminStore>(
        &self,
        store: &S,
    ) -> Result<Arc<Vec<InventoryLogEntry>>, RepositoryError> {
        match self.get_or_load(ViewKey::InventoryLog, store).await? {
            ViewValue::InventoryLog(entries) => Ok(entries),
            other => Err(mismatch(ViewKey::InventoryLog, &other)),
        }
    }

    /// Order list view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view has to be loaded and the load fails.
    pub async fn orders<S: AdminStore>(
        &self,
        store: &S,
    ) -> Result<Arc<Vec<OrderWithItems>>, RepositoryError> {
        match self.get_or_load(ViewKey::OrderList, store).await? {
            ViewValue::OrderList(orders) => Ok(orders),
            other => Err(mismatch(ViewKey::OrderList, &other)),
        }
    }

    /// Drop every view and load it again.
    ///
    /// A view that fails to load is logged and left empty; the next read
    /// retries it.
    #[instrument(skip(self, store))]
    pub async fn refresh<S: AdminStore>(&self, store: &S) {
        for key in ViewKey::ALL {
            self.cache.invalidate(&key).await;
            match self.load(key, store).await {
                Ok(value) => self.cache.insert(key, value).await,
                Err(e) => tracing::warn!(view = ?key, error = %e, "failed to refresh admin view"),
            }
        }
    }

    async fn get_or_load<S: AdminStore>(
        &self,
        key: ViewKey,
        store: &S,
    ) -> Result<ViewValue, RepositoryError> {
        if let Some(value) = self.cache.get(&key).await {
            debug!(view = ?key, "Cache hit for admin view");
            return Ok(value);
        }

        let value = self.load(key, store).await?;
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }

    async fn load<S: AdminStore>(
        &self,
        key: ViewKey,
        store: &S,
    ) -> Result<ViewValue, RepositoryError> {
        Ok(match key {
            ViewKey::InventoryList => ViewValue::InventoryList(Arc::new(store.list_inventory().await?)),
            ViewKey::InventorySummary => {
                let records = store.list_inventory().await?;
                ViewValue::InventorySummary(InventorySummary::from_records(
                    &records,
                    self.low_stock_threshold,
                ))
            }
            ViewKey::InventoryLog => {
                ViewValue::InventoryLog(Arc::new(store.list_log(self.log_page_size).await?))
            }
            ViewKey::OrderList => ViewValue::OrderList(Arc::new(store.list_orders().await?)),
        })
    }
}

fn mismatch(key: ViewKey, value: &ViewValue) -> RepositoryError {
    RepositoryError::DataCorruption(format!("view {key:?} holds {value:?}"))
}
