//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::{CatalogService, LinkAnnotator, PgStore, StoreGateway};
use crate::config::Config;
use crate::db;
use crate::metrics::Metrics;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Row source for every catalog query.
    store: Arc<dyn StoreGateway>,

    /// Catalog listings, counts and searches.
    catalog: CatalogService,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create application state backed by PostgreSQL.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        info!(
            max_connections = config.database_max_connections,
            "PostgreSQL pool created"
        );

        let store = Arc::new(PgStore::new(pool, config.statement_timeout_secs));
        Ok(Self::from_parts(store, &config.base_url, config.max_page_size))
    }

    /// Create application state over any store gateway.
    pub fn from_parts(store: Arc<dyn StoreGateway>, base_url: &str, max_page_size: i64) -> Self {
        let metrics = Arc::new(Metrics::new());
        let catalog = CatalogService::new(store.clone(), LinkAnnotator::new(base_url), max_page_size)
            .with_metrics(metrics.clone());

        Self {
            inner: Arc::new(AppStateInner {
                store,
                catalog,
                metrics,
            }),
        }
    }

    /// Get the catalog service.
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get the metrics registry.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Check if the store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.ping().await
    }
}
