//! Perfume catalog.
//!
//! Turns request filters into relational queries, runs them through a
//! [`StoreGateway`], folds composition rows into perfume → note → component
//! trees and annotates everything with links.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod kind;
pub mod links;
pub mod query_builder;
pub mod service;
pub mod store;
pub mod types;

pub use aggregate::aggregate;
pub use error::{CatalogError, CatalogResult};
pub use filter::{CrossFilter, FilterSpec, SearchField, SearchTerms};
pub use kind::{Dimension, EntityKind, KindDescriptor, Relation};
pub use links::{Annotate, LinkAnnotator};
pub use query_builder::{CatalogQueryBuilder, ListingOrder, QueryFragment, build_composition_rows};
pub use service::{CatalogService, DEFAULT_MAX_PAGE_SIZE};
pub use store::{PgStore, StoreGateway, decode_rows};
pub use types::{
    ComponentItem, CompositionRow, DimensionEntity, DimensionRow, Link, Listing, NoteItem, Page,
    PerfumeComposition, PerfumeInfo, PerfumeInfoRow,
};
