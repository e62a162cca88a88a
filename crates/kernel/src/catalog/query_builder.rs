//! Catalog query builder using SeaQuery.
//!
//! Translates a [`FilterSpec`] into a [`QueryFragment`] and renders it
//! against a fixed skeleton per listing kind:
//! - perfume info listing (base table joined to its direct dimensions)
//! - dimension listing with a correlated perfume count
//! - `COUNT(*)` over the same joins and filters
//! - composition join rows for a known set of perfumes
//!
//! Identifiers only ever come from the static kind descriptors; values are
//! escaped by SeaQuery when rendered.

use sea_query::{
    Alias, Asterisk, Expr, ExprTrait, Func, Order, PostgresQueryBuilder, Query, SelectStatement,
    SimpleExpr,
};

use super::error::{CatalogError, CatalogResult};
use super::filter::{CrossFilter, FilterSpec, SearchField};
use super::kind::{
    COMPOSITION_PERFUME_COLUMN, COMPOSITION_TABLE, Dimension, EntityKind, NAME_COLUMN,
    PERFUME_TABLE, PUBLIC_ID_COLUMN, ROW_ID_COLUMN, Relation,
};

const DESCRIPTIONS_TABLE: &str = "descriptions";
const NOTES_TABLE: &str = "notes";
const COMPONENTS_TABLE: &str = "components";

fn col(table: &str, column: &str) -> Expr {
    Expr::col((Alias::new(table), Alias::new(column)))
}

/// Pagination window converted to the unsigned form SeaQuery expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Window {
    offset: Option<u64>,
    limit: Option<u64>,
}

/// Inner join against a table on an equality condition.
#[derive(Debug, Clone)]
struct JoinClause {
    table: &'static str,
    on: SimpleExpr,
}

/// Append-only set of query pieces rendered against a skeleton.
///
/// Filters are AND-ed in insertion order. Nothing is ever replaced.
#[derive(Debug, Clone, Default)]
pub struct QueryFragment {
    filters: Vec<SimpleExpr>,
    joins: Vec<JoinClause>,
    order: Vec<(&'static str, &'static str)>,
    window: Option<Window>,
}

impl QueryFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// AND a condition onto the fragment.
    pub fn and_filter(&mut self, condition: SimpleExpr) -> &mut Self {
        self.filters.push(condition);
        self
    }

    /// Inner join `table` on `on`.
    pub fn join(&mut self, table: &'static str, on: SimpleExpr) -> &mut Self {
        self.joins.push(JoinClause { table, on });
        self
    }

    /// Append an ascending order column.
    pub fn order_by(&mut self, table: &'static str, column: &'static str) -> &mut Self {
        self.order.push((table, column));
        self
    }

    /// Set the pagination window. Both values must be non-negative.
    pub fn window(&mut self, offset: Option<i64>, limit: Option<i64>) -> CatalogResult<&mut Self> {
        let convert = |name: &str, value: Option<i64>| {
            value
                .map(|v| {
                    u64::try_from(v).map_err(|_| {
                        CatalogError::QueryBuild(format!("{name} {v} cannot be rendered"))
                    })
                })
                .transpose()
        };
        self.window = Some(Window {
            offset: convert("offset", offset)?,
            limit: convert("limit", limit)?,
        });
        Ok(self)
    }

    /// Apply joins and filters, then order and window when `paginated`.
    fn apply(&self, query: &mut SelectStatement, paginated: bool) {
        for join in &self.joins {
            query.inner_join(Alias::new(join.table), join.on.clone());
        }
        for condition in &self.filters {
            query.and_where(condition.clone());
        }
        if !paginated {
            return;
        }
        for (table, column) in &self.order {
            query.order_by((Alias::new(*table), Alias::new(*column)), Order::Asc);
        }
        if let Some(window) = self.window {
            if let Some(limit) = window.limit {
                query.limit(limit);
            }
            if let Some(offset) = window.offset {
                query.offset(offset);
            }
        }
    }
}

/// Order applied to a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingOrder {
    /// Public id ascending.
    #[default]
    ById,
    /// Name ascending, public id as tie-break (search results).
    ByName,
}

/// Builds listing and count queries for one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct CatalogQueryBuilder {
    kind: EntityKind,
    order: ListingOrder,
}

impl CatalogQueryBuilder {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            order: ListingOrder::ById,
        }
    }

    /// Use a different listing order.
    pub fn with_order(mut self, order: ListingOrder) -> Self {
        self.order = order;
        self
    }

    /// Build the filter, order and window fragment for `spec`.
    pub fn fragment(&self, spec: &FilterSpec) -> CatalogResult<QueryFragment> {
        spec.validate_for(self.kind)?;

        let table = self.kind.table();
        let mut fragment = QueryFragment::new();

        if let Some(ids) = &spec.ids {
            fragment.and_filter(col(table, PUBLIC_ID_COLUMN).is_in(ids.iter().cloned()));
        }

        if let Some(extra) = &spec.extra {
            fragment.and_filter(cross_filter_condition(extra)?);
        }

        for (field, term) in spec.search.iter() {
            fragment.and_filter(self.search_condition(field, term));
        }

        if self.order == ListingOrder::ByName {
            fragment.order_by(table, NAME_COLUMN);
        }
        fragment.order_by(table, PUBLIC_ID_COLUMN);

        fragment.window(spec.offset, spec.limit)?;
        Ok(fragment)
    }

    /// Build the paginated listing query.
    pub fn build_listing(&self, spec: &FilterSpec) -> CatalogResult<String> {
        let fragment = self.fragment(spec)?;
        let mut query = match self.kind {
            EntityKind::Perfume | EntityKind::Composition => perfume_info_skeleton(),
            EntityKind::Dimension(d) => dimension_skeleton(d),
        };
        fragment.apply(&mut query, true);
        Ok(query.to_string(PostgresQueryBuilder))
    }

    /// Build a paginated listing of perfume public ids only.
    ///
    /// Selects `info_uuid` over the same joins as [`Self::build_count`];
    /// used by perfume search results.
    pub fn build_id_listing(&self, spec: &FilterSpec) -> CatalogResult<String> {
        let fragment = self.fragment(spec)?;
        let table = self.kind.table();
        let mut query = Query::select();
        query
            .expr_as(col(table, PUBLIC_ID_COLUMN), Alias::new("info_uuid"))
            .from(Alias::new(table));
        self.base_joins(&mut query);
        fragment.apply(&mut query, true);
        Ok(query.to_string(PostgresQueryBuilder))
    }

    /// Build the COUNT query. Same joins and filters as the listing, never
    /// the window.
    pub fn build_count(&self, spec: &FilterSpec) -> CatalogResult<String> {
        let fragment = self.fragment(spec)?;
        let mut query = Query::select();
        query
            .expr(Expr::col(Asterisk).count())
            .from(Alias::new(self.kind.table()));
        self.base_joins(&mut query);
        fragment.apply(&mut query, false);
        Ok(query.to_string(PostgresQueryBuilder))
    }

    /// Joins every query over this kind shares with its listing skeleton.
    fn base_joins(&self, query: &mut SelectStatement) {
        if matches!(self.kind, EntityKind::Perfume | EntityKind::Composition) {
            for join in perfume_info_joins() {
                query.inner_join(Alias::new(join.table), join.on);
            }
        }
    }

    /// Condition for one search term on this listing.
    fn search_condition(&self, field: SearchField, term: &str) -> SimpleExpr {
        match (self.kind, field) {
            (EntityKind::Dimension(d), _) => term_match(d.descriptor().table, term),
            (_, SearchField::Name) => term_match(PERFUME_TABLE, term),
            (_, SearchField::Dimension(d)) => {
                let descriptor = d.descriptor();
                let mut sub = Query::select();
                match descriptor.relation {
                    Relation::Direct { column } => {
                        sub.column((Alias::new(descriptor.table), Alias::new(ROW_ID_COLUMN)))
                            .from(Alias::new(descriptor.table))
                            .and_where(term_match(descriptor.table, term));
                        col(PERFUME_TABLE, column).in_subquery(sub)
                    }
                    Relation::Through { column } => {
                        through_subquery(&mut sub, descriptor.table, column)
                            .and_where(term_match(descriptor.table, term));
                        col(PERFUME_TABLE, ROW_ID_COLUMN).in_subquery(sub)
                    }
                }
            }
        }
    }
}

/// Build the join-row query for the composition of `perfume_ids`.
///
/// One row per (perfume, note, component), ordered by perfume id, note
/// name, note id, component name, component id.
pub fn build_composition_rows(perfume_ids: &[String]) -> CatalogResult<String> {
    if perfume_ids.is_empty() {
        return Err(CatalogError::QueryBuild(
            "composition rows requested for no perfumes".to_string(),
        ));
    }

    let mut query = Query::select();
    query
        .expr_as(col(PERFUME_TABLE, PUBLIC_ID_COLUMN), Alias::new("info_uuid"))
        .expr_as(col(NOTES_TABLE, PUBLIC_ID_COLUMN), Alias::new("note_uuid"))
        .expr_as(col(NOTES_TABLE, NAME_COLUMN), Alias::new("note_name"))
        .expr_as(col(COMPONENTS_TABLE, PUBLIC_ID_COLUMN), Alias::new("component_uuid"))
        .expr_as(col(COMPONENTS_TABLE, NAME_COLUMN), Alias::new("component_name"))
        .from(Alias::new(COMPOSITION_TABLE))
        .inner_join(
            Alias::new(PERFUME_TABLE),
            col(COMPOSITION_TABLE, COMPOSITION_PERFUME_COLUMN)
                .equals((Alias::new(PERFUME_TABLE), Alias::new(ROW_ID_COLUMN))),
        )
        .inner_join(
            Alias::new(NOTES_TABLE),
            col(COMPOSITION_TABLE, "note_id")
                .equals((Alias::new(NOTES_TABLE), Alias::new(ROW_ID_COLUMN))),
        )
        .inner_join(
            Alias::new(COMPONENTS_TABLE),
            col(COMPOSITION_TABLE, "component_id")
                .equals((Alias::new(COMPONENTS_TABLE), Alias::new(ROW_ID_COLUMN))),
        )
        .and_where(col(PERFUME_TABLE, PUBLIC_ID_COLUMN).is_in(perfume_ids.iter().cloned()))
        .order_by((Alias::new(PERFUME_TABLE), Alias::new(PUBLIC_ID_COLUMN)), Order::Asc)
        .order_by((Alias::new(NOTES_TABLE), Alias::new(NAME_COLUMN)), Order::Asc)
        .order_by((Alias::new(NOTES_TABLE), Alias::new(PUBLIC_ID_COLUMN)), Order::Asc)
        .order_by((Alias::new(COMPONENTS_TABLE), Alias::new(NAME_COLUMN)), Order::Asc)
        .order_by(
            (Alias::new(COMPONENTS_TABLE), Alias::new(PUBLIC_ID_COLUMN)),
            Order::Asc,
        );

    Ok(query.to_string(PostgresQueryBuilder))
}

/// Translate foreign ids into a condition on `parfum_info`.
fn cross_filter_condition(extra: &CrossFilter) -> CatalogResult<SimpleExpr> {
    let ids = extra.ids.iter().cloned();
    match extra.source {
        EntityKind::Perfume => Ok(col(PERFUME_TABLE, PUBLIC_ID_COLUMN).is_in(ids)),
        EntityKind::Dimension(d) => {
            let descriptor = d.descriptor();
            let mut sub = Query::select();
            match descriptor.relation {
                Relation::Direct { column } => {
                    sub.column((Alias::new(descriptor.table), Alias::new(ROW_ID_COLUMN)))
                        .from(Alias::new(descriptor.table))
                        .and_where(col(descriptor.table, PUBLIC_ID_COLUMN).is_in(ids));
                    Ok(col(PERFUME_TABLE, column).in_subquery(sub))
                }
                Relation::Through { column } => {
                    through_subquery(&mut sub, descriptor.table, column)
                        .and_where(col(descriptor.table, PUBLIC_ID_COLUMN).is_in(ids));
                    Ok(col(PERFUME_TABLE, ROW_ID_COLUMN).in_subquery(sub))
                }
            }
        }
        EntityKind::Composition => Err(CatalogError::QueryBuild(
            "composition ids cannot be used as a cross filter".to_string(),
        )),
    }
}

/// `SELECT parfums.parfum_info_id FROM parfums INNER JOIN <table>
/// ON parfums.<column> = <table>.id`
fn through_subquery<'a>(
    sub: &'a mut SelectStatement,
    table: &'static str,
    column: &'static str,
) -> &'a mut SelectStatement {
    sub.column((
        Alias::new(COMPOSITION_TABLE),
        Alias::new(COMPOSITION_PERFUME_COLUMN),
    ))
    .from(Alias::new(COMPOSITION_TABLE))
    .inner_join(
        Alias::new(table),
        col(COMPOSITION_TABLE, column).equals((Alias::new(table), Alias::new(ROW_ID_COLUMN))),
    )
}

/// Case-insensitive substring match on the name column, or exact id match.
fn term_match(table: &str, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like_wildcards(&term.to_lowercase()));
    Expr::expr(Func::lower(col(table, NAME_COLUMN)))
        .like(pattern)
        .or(col(table, PUBLIC_ID_COLUMN).eq(term))
}

/// Joins shared by the perfume info listing and its count.
fn perfume_info_joins() -> Vec<JoinClause> {
    let mut joins = vec![JoinClause {
        table: DESCRIPTIONS_TABLE,
        on: col(PERFUME_TABLE, "description_id")
            .equals((Alias::new(DESCRIPTIONS_TABLE), Alias::new(ROW_ID_COLUMN))),
    }];
    for d in Dimension::DIRECT {
        let descriptor = d.descriptor();
        if let Relation::Direct { column } = descriptor.relation {
            joins.push(JoinClause {
                table: descriptor.table,
                on: col(PERFUME_TABLE, column)
                    .equals((Alias::new(descriptor.table), Alias::new(ROW_ID_COLUMN))),
            });
        }
    }
    joins
}

/// `SELECT ... FROM parfum_info` with its direct dimensions joined.
fn perfume_info_skeleton() -> SelectStatement {
    let mut query = Query::select();
    query
        .expr_as(col(PERFUME_TABLE, PUBLIC_ID_COLUMN), Alias::new("info_uuid"))
        .expr_as(col(PERFUME_TABLE, NAME_COLUMN), Alias::new("name"))
        .expr_as(
            col(DESCRIPTIONS_TABLE, PUBLIC_ID_COLUMN),
            Alias::new("description_uuid"),
        )
        .expr_as(col(DESCRIPTIONS_TABLE, "text"), Alias::new("description"))
        .expr_as(col(PERFUME_TABLE, "year"), Alias::new("info_year"));

    for d in Dimension::DIRECT {
        let descriptor = d.descriptor();
        query
            .expr_as(
                col(descriptor.table, PUBLIC_ID_COLUMN),
                Alias::new(format!("{}_uuid", descriptor.column_prefix)),
            )
            .expr_as(
                col(descriptor.table, NAME_COLUMN),
                Alias::new(format!("{}_name", descriptor.column_prefix)),
            );
    }

    query
        .column((Alias::new(PERFUME_TABLE), Alias::new("img_uuid")))
        .column((Alias::new(PERFUME_TABLE), Alias::new("stars_uuid")))
        .column((Alias::new(PERFUME_TABLE), Alias::new("shop_uuid")))
        .from(Alias::new(PERFUME_TABLE));

    for join in perfume_info_joins() {
        query.inner_join(Alias::new(join.table), join.on);
    }
    query
}

/// `SELECT uuid AS id, name, img_uuid, <count> AS perfums_count FROM <table>`
fn dimension_skeleton(dimension: Dimension) -> SelectStatement {
    let descriptor = dimension.descriptor();
    let table = descriptor.table;
    let count_sql = match descriptor.relation {
        Relation::Direct { column } => format!(
            "(SELECT COUNT(*) FROM {PERFUME_TABLE} WHERE {PERFUME_TABLE}.{column} = {table}.{ROW_ID_COLUMN})"
        ),
        Relation::Through { column } => format!(
            "(SELECT COUNT(DISTINCT {COMPOSITION_TABLE}.{COMPOSITION_PERFUME_COLUMN}) FROM {COMPOSITION_TABLE} WHERE {COMPOSITION_TABLE}.{column} = {table}.{ROW_ID_COLUMN})"
        ),
    };

    let mut query = Query::select();
    query
        .expr_as(col(table, PUBLIC_ID_COLUMN), Alias::new("id"))
        .column((Alias::new(table), Alias::new(NAME_COLUMN)))
        .column((Alias::new(table), Alias::new("img_uuid")))
        .expr_as(Expr::cust(count_sql), Alias::new("perfums_count"))
        .from(Alias::new(table));
    query
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand() -> EntityKind {
        EntityKind::Dimension(Dimension::Brand)
    }

    #[test]
    fn perfume_listing_joins_direct_dimensions() {
        let sql = CatalogQueryBuilder::new(EntityKind::Perfume)
            .build_listing(&FilterSpec::default())
            .unwrap();

        assert!(sql.contains("FROM \"parfum_info\""));
        for table in [
            "descriptions",
            "brands",
            "countries",
            "gender",
            "groups",
            "seasons",
            "times_of_day",
            "types",
        ] {
            assert!(
                sql.contains(&format!("INNER JOIN \"{table}\"")),
                "missing join on {table}: {sql}"
            );
        }
        assert!(sql.contains("AS \"tsod_name\""));
        assert!(sql.contains("ORDER BY \"parfum_info\".\"uuid\" ASC"));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("OFFSET"));
    }

    #[test]
    fn ids_become_in_clause() {
        let spec = FilterSpec::default().with_ids(["A", "B"]);
        let sql = CatalogQueryBuilder::new(EntityKind::Perfume)
            .build_listing(&spec)
            .unwrap();

        assert!(sql.contains("\"parfum_info\".\"uuid\" IN ('A', 'B')"));
    }

    #[test]
    fn window_is_applied_last_and_never_counted() {
        let spec = FilterSpec::default()
            .with_ids(["A"])
            .with_window(Some(20), Some(10));
        let builder = CatalogQueryBuilder::new(EntityKind::Perfume);

        let listing = builder.build_listing(&spec).unwrap();
        assert!(listing.contains("LIMIT 10"));
        assert!(listing.contains("OFFSET 20"));

        let count = builder.build_count(&spec).unwrap();
        assert!(count.contains("COUNT(*)"));
        assert!(count.contains("IN ('A')"));
        assert!(!count.contains("LIMIT"));
        assert!(!count.contains("OFFSET"));
        assert!(!count.contains("ORDER BY"));
    }

    #[test]
    fn count_uses_listing_joins() {
        let count = CatalogQueryBuilder::new(EntityKind::Perfume)
            .build_count(&FilterSpec::default())
            .unwrap();
        assert!(count.contains("INNER JOIN \"brands\""));
        assert!(count.contains("INNER JOIN \"descriptions\""));
    }

    #[test]
    fn direct_cross_filter_uses_foreign_key_subquery() {
        let spec = FilterSpec::default().with_extra(brand(), ["b1"]);
        let sql = CatalogQueryBuilder::new(EntityKind::Perfume)
            .build_listing(&spec)
            .unwrap();

        assert!(sql.contains("\"parfum_info\".\"brand_id\" IN (SELECT \"brands\".\"id\" FROM \"brands\""));
        assert!(sql.contains("\"brands\".\"uuid\" IN ('b1')"));
    }

    #[test]
    fn through_cross_filter_goes_via_link_table() {
        let spec = FilterSpec::default().with_extra(EntityKind::Dimension(Dimension::Note), ["n1"]);
        let sql = CatalogQueryBuilder::new(EntityKind::Perfume)
            .build_count(&spec)
            .unwrap();

        assert!(sql.contains("\"parfum_info\".\"id\" IN (SELECT \"parfums\".\"parfum_info_id\" FROM \"parfums\""));
        assert!(sql.contains("INNER JOIN \"notes\" ON \"parfums\".\"note_id\" = \"notes\".\"id\""));
        assert!(sql.contains("\"notes\".\"uuid\" IN ('n1')"));
    }

    #[test]
    fn ids_and_cross_filter_are_anded() {
        let spec = FilterSpec::default()
            .with_ids(["p1"])
            .with_extra(brand(), ["b1"]);
        let builder = CatalogQueryBuilder::new(EntityKind::Perfume);
        let fragment = builder.fragment(&spec).unwrap();
        assert_eq!(fragment.filters.len(), 2);

        let sql = builder.build_listing(&spec).unwrap();
        assert!(sql.contains(" AND "));
        assert!(!sql.contains(" OR "));
    }

    #[test]
    fn empty_cross_filter_is_rejected() {
        let spec = FilterSpec::default().with_extra(brand(), Vec::<String>::new());
        let err = CatalogQueryBuilder::new(EntityKind::Perfume)
            .build_listing(&spec)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFilter(_)));
    }

    #[test]
    fn dimension_listing_selects_perfume_count() {
        let sql = CatalogQueryBuilder::new(brand())
            .build_listing(&FilterSpec::default())
            .unwrap();
        assert!(sql.contains("\"brands\".\"uuid\" AS \"id\""));
        assert!(sql.contains("(SELECT COUNT(*) FROM parfum_info WHERE parfum_info.brand_id = brands.id) AS \"perfums_count\""));

        let notes = CatalogQueryBuilder::new(EntityKind::Dimension(Dimension::Note))
            .build_listing(&FilterSpec::default())
            .unwrap();
        assert!(notes.contains("COUNT(DISTINCT parfums.parfum_info_id)"));
    }

    #[test]
    fn search_term_matches_name_or_id() {
        let spec = FilterSpec::default().with_term(SearchField::Name, "Chanel");
        let sql = CatalogQueryBuilder::new(brand())
            .with_order(ListingOrder::ByName)
            .build_listing(&spec)
            .unwrap();

        assert!(sql.contains("LOWER(\"brands\".\"name\") LIKE '%chanel%'"));
        assert!(sql.contains("\"brands\".\"uuid\" = 'Chanel'"));
        assert!(sql.contains("ORDER BY \"brands\".\"name\" ASC, \"brands\".\"uuid\" ASC"));
    }

    #[test]
    fn note_term_on_perfumes_uses_link_table() {
        let spec = FilterSpec::default().with_term(SearchField::Dimension(Dimension::Note), "rose");
        let sql = CatalogQueryBuilder::new(EntityKind::Perfume)
            .build_id_listing(&spec)
            .unwrap();

        assert!(sql.contains("AS \"info_uuid\""));
        assert!(sql.contains("FROM \"parfums\" INNER JOIN \"notes\""));
        assert!(sql.contains("LOWER(\"notes\".\"name\") LIKE '%rose%'"));
    }

    #[test]
    fn perfume_search_count_and_ids_share_joins() {
        let spec = FilterSpec::default()
            .with_term(SearchField::Name, "50%_o'k")
            .with_window(Some(10), Some(5));
        let builder = CatalogQueryBuilder::new(EntityKind::Perfume);
        let ids = builder.build_id_listing(&spec).unwrap();
        let count = builder.build_count(&spec).unwrap();

        let from_clause = |sql: &str| {
            let start = sql.find(" FROM ").unwrap();
            let end = sql.find(" WHERE ").unwrap();
            sql[start..end].to_string()
        };
        assert_eq!(from_clause(&ids), from_clause(&count));
        assert!(from_clause(&ids).contains("INNER JOIN \"types\""));
        assert!(ids.contains("LIMIT 5"));
        assert!(!count.contains("LIMIT"));
    }

    #[test]
    fn composition_rows_have_deterministic_order() {
        let sql = build_composition_rows(&["p2".to_string(), "p1".to_string()]).unwrap();

        assert!(sql.contains("FROM \"parfums\""));
        assert!(sql.contains("\"parfum_info\".\"uuid\" IN ('p2', 'p1')"));
        assert!(sql.contains(
            "ORDER BY \"parfum_info\".\"uuid\" ASC, \"notes\".\"name\" ASC, \"notes\".\"uuid\" ASC, \"components\".\"name\" ASC, \"components\".\"uuid\" ASC"
        ));
    }

    #[test]
    fn composition_rows_need_ids() {
        assert!(matches!(
            build_composition_rows(&[]),
            Err(CatalogError::QueryBuild(_))
        ));
    }

    #[test]
    fn negative_window_cannot_render() {
        let mut fragment = QueryFragment::new();
        assert!(fragment.window(Some(-1), None).is_err());
        assert!(fragment.window(Some(0), Some(5)).is_ok());
        assert_eq!(
            fragment.window,
            Some(Window {
                offset: Some(0),
                limit: Some(5),
            })
        );
    }

    #[test]
    fn like_wildcards_escaped() {
        assert_eq!(escape_like_wildcards("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like_wildcards("a\\b"), "a\\\\b");
        assert_eq!(escape_like_wildcards("plain"), "plain");
    }
}
