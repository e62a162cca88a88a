//! Catalog error taxonomy.
//!
//! Every variant is terminal for the request that produced it. The HTTP
//! layer maps them to status codes in [`crate::error::AppError`].

use thiserror::Error;

/// Errors raised while building a catalog listing.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Missing or empty required input.
    #[error("invalid args: {0}")]
    InvalidArgs(String),

    /// Ambiguous or contradictory filter combination.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A query could not be composed from its fragments.
    #[error("query build failed: {0}")]
    QueryBuild(String),

    /// The store call failed or returned rows of the wrong shape.
    #[error("store error")]
    Store(#[source] anyhow::Error),

    /// Join rows were malformed.
    #[error("aggregation failed: {0}")]
    Aggregation(String),

    /// A finished listing could not be encoded as JSON.
    #[error("listing encoding failed")]
    Encode(#[source] serde_json::Error),
}

impl CatalogError {
    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidArgs(_) | CatalogError::InvalidFilter(_)
        )
    }

    /// Short label used in metrics.
    pub fn label(&self) -> &'static str {
        match self {
            CatalogError::InvalidArgs(_) => "invalid_args",
            CatalogError::InvalidFilter(_) => "invalid_filter",
            CatalogError::QueryBuild(_) => "query_build",
            CatalogError::Store(_) => "store",
            CatalogError::Aggregation(_) => "aggregation",
            CatalogError::Encode(_) => "encode",
        }
    }
}

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;
