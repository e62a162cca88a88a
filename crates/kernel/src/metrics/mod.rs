//! Prometheus metrics collection.
//!
//! Provides catalog metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Catalog request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CatalogLabels {
    pub kind: String,
    pub operation: String,
    pub outcome: String,
}

/// Store query labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StoreLabels {
    pub query: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// Catalog requests by kind/operation/outcome.
    pub catalog_requests: Family<CatalogLabels, Counter>,

    /// Store query duration by query shape (rows/count).
    pub store_query_duration_seconds: Family<StoreLabels, Histogram>,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let catalog_requests = Family::<CatalogLabels, Counter>::default();
        registry.register(
            "catalog_requests_total",
            "Total catalog listing requests",
            catalog_requests.clone(),
        );

        let store_query_duration_seconds =
            Family::<StoreLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.0001, 2.0, 14))
            });
        registry.register(
            "store_query_duration_seconds",
            "Store query duration in seconds",
            store_query_duration_seconds.clone(),
        );

        Self {
            registry,
            catalog_requests,
            store_query_duration_seconds,
        }
    }

    /// Record a finished catalog request.
    pub fn record_request(&self, kind: &str, operation: &str, outcome: &str) {
        let labels = CatalogLabels {
            kind: kind.to_string(),
            operation: operation.to_string(),
            outcome: outcome.to_string(),
        };
        self.catalog_requests.get_or_create(&labels).inc();
    }

    /// Record a store query.
    pub fn record_store_query(&self, query: &str, duration_secs: f64) {
        let labels = StoreLabels {
            query: query.to_string(),
        };
        self.store_query_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible, and all metric
    /// labels use derived `EncodeLabelSet` impls that do not produce
    /// `fmt::Error`.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}
