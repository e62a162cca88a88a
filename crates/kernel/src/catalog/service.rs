//! Catalog service.
//!
//! One generic implementation of the listing contract for every entity
//! kind: build the fragment, run the count and listing queries, fold
//! composition rows, annotate, and return a page.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::aggregate::aggregate;
use super::error::{CatalogError, CatalogResult};
use super::filter::{FilterSpec, SearchField};
use super::kind::{Dimension, EntityKind};
use super::links::{Annotate, LinkAnnotator};
use super::query_builder::{CatalogQueryBuilder, ListingOrder, build_composition_rows};
use super::store::{StoreGateway, decode_rows};
use super::types::{
    CompositionRow, DimensionEntity, DimensionRow, Link, Listing, Page, PerfumeComposition,
    PerfumeIdRow, PerfumeInfo, PerfumeInfoRow,
};
use crate::metrics::Metrics;

/// Default upper bound on the page size a caller may request.
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 100;

/// List key of perfume search results.
const SEARCH_LINKS_KEY: &str = "links";

/// Service serving catalog listings, counts and searches.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn StoreGateway>,
    links: LinkAnnotator,
    max_page_size: i64,
    metrics: Option<Arc<Metrics>>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn StoreGateway>, links: LinkAnnotator, max_page_size: i64) -> Self {
        Self {
            store,
            links,
            max_page_size,
            metrics: None,
        }
    }

    /// Record request and store metrics.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// List entities of `kind` matching `spec`.
    pub async fn list(&self, kind: EntityKind, spec: FilterSpec) -> CatalogResult<Listing> {
        let result = self.list_inner(kind, spec).await;
        self.record(kind, "list", &result);
        result
    }

    /// List entities related to `foreign_ids` of kind `source`.
    ///
    /// Dimension ids return perfume info rows; perfume ids return their
    /// compositions.
    pub async fn list_related(
        &self,
        source: EntityKind,
        foreign_ids: &[String],
        spec: FilterSpec,
    ) -> CatalogResult<Listing> {
        let result = async {
            let (target, spec) = related_spec(source, foreign_ids, spec)?;
            self.list_inner(target, spec).await
        }
        .await;
        self.record(source, "list_related", &result);
        result
    }

    /// Count entities of `kind` matching `spec`, ignoring its window.
    pub async fn count(&self, kind: EntityKind, spec: &FilterSpec) -> CatalogResult<i64> {
        let result = self.count_inner(kind, spec).await;
        self.record(kind, "count", &result);
        result
    }

    /// Count entities related to `foreign_ids` of kind `source`.
    pub async fn count_related(
        &self,
        source: EntityKind,
        foreign_ids: &[String],
    ) -> CatalogResult<i64> {
        let result = async {
            let (target, spec) = related_spec(source, foreign_ids, FilterSpec::default())?;
            self.count_inner(target, &spec).await
        }
        .await;
        self.record(source, "count_related", &result);
        result
    }

    /// Search entities of `kind` by the terms in `spec`.
    ///
    /// A dimension search without a term for that dimension is an empty
    /// result, not an error. Perfume searches return one self link per match.
    pub async fn search(&self, kind: EntityKind, spec: FilterSpec) -> CatalogResult<Listing> {
        let result = self.search_inner(kind, spec).await;
        self.record(kind, "search", &result);
        result
    }

    async fn list_inner(&self, kind: EntityKind, spec: FilterSpec) -> CatalogResult<Listing> {
        let spec = self.cap_page_size(kind, spec);
        let listing = match kind {
            EntityKind::Perfume => Listing::Perfumes(self.perfume_page(&spec).await?),
            EntityKind::Composition => Listing::Compositions(self.composition_page(&spec).await?),
            EntityKind::Dimension(d) => {
                Listing::Dimensions(self.dimension_page(d, &spec, ListingOrder::ById).await?)
            }
        };
        debug!(
            kind = %kind,
            total = listing.total(),
            amount = listing.amount(),
            "catalog listing built"
        );
        Ok(listing)
    }

    async fn count_inner(&self, kind: EntityKind, spec: &FilterSpec) -> CatalogResult<i64> {
        let sql = CatalogQueryBuilder::new(kind).build_count(spec)?;
        self.fetch_count(&sql).await
    }

    async fn search_inner(&self, kind: EntityKind, spec: FilterSpec) -> CatalogResult<Listing> {
        spec.validate_for(kind)?;
        let spec = self.cap_page_size(kind, spec);
        let offset = spec.offset_or_default();

        match kind {
            EntityKind::Dimension(d) => {
                let has_term = spec.search.get(SearchField::Dimension(d)).is_some()
                    || spec.search.get(SearchField::Name).is_some();
                if !has_term {
                    debug!(kind = %kind, "no search term for dimension, returning empty page");
                    return Ok(Listing::Dimensions(Page::empty(kind, offset)));
                }
                Ok(Listing::Dimensions(
                    self.dimension_page(d, &spec, ListingOrder::ByName).await?,
                ))
            }
            EntityKind::Perfume => {
                if spec.search.is_empty() {
                    debug!("no perfume search terms, returning empty page");
                    return Ok(Listing::Links(Page::with_key(
                        SEARCH_LINKS_KEY,
                        Vec::new(),
                        0,
                        offset,
                    )));
                }
                let builder = CatalogQueryBuilder::new(kind);
                let total = self.fetch_count(&builder.build_count(&spec)?).await?;
                let rows: Vec<PerfumeIdRow> =
                    self.fetch_rows(&builder.build_id_listing(&spec)?).await?;
                let links: Vec<Link> = rows
                    .iter()
                    .map(|row| self.links.info_link(EntityKind::Perfume, &row.info_uuid))
                    .collect();
                Ok(Listing::Links(Page::with_key(
                    SEARCH_LINKS_KEY,
                    links,
                    total,
                    offset,
                )))
            }
            EntityKind::Composition => Err(CatalogError::InvalidArgs(
                "compositions cannot be searched, search perfums instead".to_string(),
            )),
        }
    }

    async fn perfume_page(&self, spec: &FilterSpec) -> CatalogResult<Page<PerfumeInfo>> {
        let builder = CatalogQueryBuilder::new(EntityKind::Perfume);
        let total = self.fetch_count(&builder.build_count(spec)?).await?;
        let items = self.perfume_infos(&builder, spec).await?;
        Ok(Page::new(
            EntityKind::Perfume,
            items,
            total,
            spec.offset_or_default(),
        ))
    }

    async fn composition_page(&self, spec: &FilterSpec) -> CatalogResult<Page<PerfumeComposition>> {
        let kind = EntityKind::Composition;
        let builder = CatalogQueryBuilder::new(kind);
        let total = self.fetch_count(&builder.build_count(spec)?).await?;
        let infos = self.perfume_infos(&builder, spec).await?;
        let offset = spec.offset_or_default();

        if infos.is_empty() {
            return Ok(Page::new(kind, Vec::new(), total, offset));
        }

        let ids: Vec<String> = infos.iter().map(|info| info.id.clone()).collect();
        let rows: Vec<CompositionRow> = self.fetch_rows(&build_composition_rows(&ids)?).await?;
        debug!(perfumes = ids.len(), rows = rows.len(), "folding composition rows");

        let by_id: HashMap<String, PerfumeInfo> = infos
            .into_iter()
            .map(|info| (info.id.clone(), info))
            .collect();
        let mut items = aggregate(rows, &by_id)?;
        for item in &mut items {
            item.annotate(&self.links);
        }

        Ok(Page::new(kind, items, total, offset))
    }

    async fn perfume_infos(
        &self,
        builder: &CatalogQueryBuilder,
        spec: &FilterSpec,
    ) -> CatalogResult<Vec<PerfumeInfo>> {
        let rows: Vec<PerfumeInfoRow> = self.fetch_rows(&builder.build_listing(spec)?).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let mut info = PerfumeInfo::from(row);
                info.annotate(&self.links);
                info
            })
            .collect())
    }

    async fn dimension_page(
        &self,
        dimension: Dimension,
        spec: &FilterSpec,
        order: ListingOrder,
    ) -> CatalogResult<Page<DimensionEntity>> {
        let kind = EntityKind::Dimension(dimension);
        let builder = CatalogQueryBuilder::new(kind).with_order(order);
        let total = self.fetch_count(&builder.build_count(spec)?).await?;
        let rows: Vec<DimensionRow> = self.fetch_rows(&builder.build_listing(spec)?).await?;
        let items = rows
            .into_iter()
            .map(|row| {
                let mut entity = DimensionEntity::from_row(dimension, row);
                entity.annotate(&self.links);
                entity
            })
            .collect();
        Ok(Page::new(kind, items, total, spec.offset_or_default()))
    }

    /// Cap a requested limit at the configured maximum. Absent stays absent.
    fn cap_page_size(&self, kind: EntityKind, mut spec: FilterSpec) -> FilterSpec {
        if let Some(limit) = spec.limit
            && limit > self.max_page_size
        {
            warn!(
                kind = %kind,
                requested = limit,
                max = self.max_page_size,
                "requested page size exceeds maximum, capping"
            );
            spec.limit = Some(self.max_page_size);
        }
        spec
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, sql: &str) -> CatalogResult<Vec<T>> {
        let start = Instant::now();
        let rows = self.store.fetch_rows(sql).await;
        self.record_store("rows", start);
        decode_rows(rows.map_err(CatalogError::Store)?)
    }

    async fn fetch_count(&self, sql: &str) -> CatalogResult<i64> {
        let start = Instant::now();
        let total = self.store.fetch_count(sql).await;
        self.record_store("count", start);
        total.map_err(CatalogError::Store)
    }

    fn record_store(&self, query: &str, start: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_store_query(query, start.elapsed().as_secs_f64());
        }
    }

    fn record<T>(&self, kind: EntityKind, operation: &str, result: &CatalogResult<T>) {
        if let Some(metrics) = &self.metrics {
            let outcome = match result {
                Ok(_) => "ok",
                Err(e) => e.label(),
            };
            metrics.record_request(kind.label(), operation, outcome);
        }
    }
}

/// Resolve the target kind and AND the cross filter onto `spec`.
fn related_spec(
    source: EntityKind,
    foreign_ids: &[String],
    spec: FilterSpec,
) -> CatalogResult<(EntityKind, FilterSpec)> {
    if foreign_ids.is_empty() {
        return Err(CatalogError::InvalidArgs(format!(
            "no {source} ids given for related listing"
        )));
    }
    let target = source.related_target().ok_or_else(|| {
        CatalogError::InvalidFilter(format!("{source} has no related listing"))
    })?;
    if spec.extra.is_some() {
        return Err(CatalogError::InvalidFilter(
            "a cross filter is already present".to_string(),
        ));
    }
    Ok((target, spec.with_extra(source, foreign_ids.iter().cloned())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn related_spec_targets_perfumes_for_dimensions() {
        let brand = EntityKind::Dimension(Dimension::Brand);
        let (target, spec) = related_spec(brand, &ids(&["b1"]), FilterSpec::default()).unwrap();

        assert_eq!(target, EntityKind::Perfume);
        assert_eq!(spec.extra_ids(), Some(&ids(&["b1"])[..]));
    }

    #[test]
    fn related_spec_targets_compositions_for_perfumes() {
        let (target, _) =
            related_spec(EntityKind::Perfume, &ids(&["p1"]), FilterSpec::default()).unwrap();
        assert_eq!(target, EntityKind::Composition);
    }

    #[test]
    fn related_spec_requires_ids() {
        let err = related_spec(
            EntityKind::Dimension(Dimension::Note),
            &[],
            FilterSpec::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgs(_)));
    }

    #[test]
    fn related_spec_rejects_second_cross_filter() {
        let spec = FilterSpec::default()
            .with_extra(EntityKind::Dimension(Dimension::Season), ["s1"]);
        let err = related_spec(
            EntityKind::Dimension(Dimension::Brand),
            &ids(&["b1"]),
            spec,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFilter(_)));
    }

    #[test]
    fn composition_has_no_related_listing() {
        let err = related_spec(EntityKind::Composition, &ids(&["p1"]), FilterSpec::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFilter(_)));
    }
}
