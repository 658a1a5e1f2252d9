//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::PgAdminStore;
use crate::services::ViewCache;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    views: ViewCache,
}

impl AppState {
    /// Create application state with an empty view cache.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let views = ViewCache::new(config.low_stock_threshold, config.log_page_size);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                views,
            }),
        }
    }

    /// Admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// `PostgreSQL`-backed store for the admin services.
    #[must_use]
    pub fn store(&self) -> PgAdminStore<'_> {
        PgAdminStore::new(&self.inner.pool)
    }

    /// Cached admin views.
    #[must_use]
    pub fn views(&self) -> &ViewCache {
        &self.inner.views
    }
}
