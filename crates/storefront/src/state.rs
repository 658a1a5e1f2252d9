//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use sillage_core::PerfumeId;

use crate::config::StorefrontConfig;
use crate::models::Perfume;
use crate::signals::CartSignals;

/// How long a perfume detail stays cached.
const PERFUME_CACHE_TTL: Duration = Duration::from_secs(300);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    signals: CartSignals,
    perfumes: Cache<PerfumeId, Arc<Perfume>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let perfumes = Cache::builder()
            .max_capacity(1000)
            .time_to_live(PERFUME_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                signals: CartSignals::new(),
                perfumes,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cart-count signal registry.
    #[must_use]
    pub fn signals(&self) -> &CartSignals {
        &self.inner.signals
    }

    /// Get a reference to the perfume detail cache.
    #[must_use]
    pub fn perfume_cache(&self) -> &Cache<PerfumeId, Arc<Perfume>> {
        &self.inner.perfumes
    }
}
