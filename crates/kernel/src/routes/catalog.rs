//! Catalog listing routes.
//!
//! Thin controllers: parse query parameters into a [`FilterSpec`], call the
//! catalog service and render the listing.

use std::collections::HashMap;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::catalog::{Dimension, EntityKind, FilterSpec, Listing};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Create the catalog router.
///
/// Dimension routes are generated from the kind descriptors.
pub fn router() -> Router<AppState> {
    let mut router = Router::new()
        .route("/perfums", get(list_perfumes))
        .route("/perfums/composition", get(list_compositions))
        .route("/perfum/{id}", get(perfume_composition))
        .route("/search/perfums", get(search_perfumes));

    for dimension in Dimension::ALL {
        let descriptor = dimension.descriptor();
        router = router
            .route(
                &format!("/{}", descriptor.plural),
                get(move |state: State<AppState>, params: Query<ListParams>| {
                    list_dimension(dimension, state, params)
                }),
            )
            .route(
                &format!("/{}/{{id}}", descriptor.segment),
                get(
                    move |state: State<AppState>,
                          id: Path<String>,
                          params: Query<ListParams>| {
                        get_dimension(dimension, state, id, params)
                    },
                ),
            )
            .route(
                &format!("/{}/{{id}}/perfums", descriptor.segment),
                get(
                    move |state: State<AppState>,
                          id: Path<String>,
                          params: Query<ListParams>| {
                        related_perfumes(dimension, state, id, params)
                    },
                ),
            )
            .route(
                &format!("/search/{}", descriptor.plural),
                get(move |state: State<AppState>, params: Query<ListParams>| {
                    search_dimension(dimension, state, params)
                }),
            );
    }

    router
}

// -------------------------------------------------------------------------
// Request types
// -------------------------------------------------------------------------

/// Listing query parameters.
///
/// Window values are kept as strings so a malformed value is reported as
/// an invalid argument instead of a generic rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    ids: Option<String>,
    offset: Option<String>,
    limit: Option<String>,
    /// Search terms keyed by attribute.
    #[serde(flatten)]
    terms: HashMap<String, String>,
}

impl ListParams {
    fn into_spec(self) -> AppResult<FilterSpec> {
        Ok(FilterSpec::from_params(
            self.ids.as_deref(),
            self.offset.as_deref(),
            self.limit.as_deref(),
            self.terms,
        )?)
    }
}

fn split_path_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn render(listing: Listing) -> AppResult<Response> {
    let body = listing.to_json_bytes()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

async fn list_perfumes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let spec = params.into_spec()?;
    render(state.catalog().list(EntityKind::Perfume, spec).await?)
}

async fn list_compositions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let spec = params.into_spec()?;
    render(state.catalog().list(EntityKind::Composition, spec).await?)
}

/// Composition of the perfumes named in the path.
async fn perfume_composition(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let spec = params.into_spec()?;
    let ids = split_path_ids(&id);
    render(
        state
            .catalog()
            .list_related(EntityKind::Perfume, &ids, spec)
            .await?,
    )
}

async fn search_perfumes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let spec = params.into_spec()?;
    render(state.catalog().search(EntityKind::Perfume, spec).await?)
}

async fn list_dimension(
    dimension: Dimension,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let spec = params.into_spec()?;
    render(state.catalog().list(dimension.into(), spec).await?)
}

/// One dimension entity. The path id is the id filter.
async fn get_dimension(
    dimension: Dimension,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let spec = params.into_spec()?;
    if spec.ids.is_some() {
        return Err(AppError::BadRequest(
            "ids cannot be combined with a path id".to_string(),
        ));
    }
    let spec = spec.with_ids(split_path_ids(&id));
    render(state.catalog().list(dimension.into(), spec).await?)
}

/// Perfumes related to the dimension ids in the path.
async fn related_perfumes(
    dimension: Dimension,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let spec = params.into_spec()?;
    let ids = split_path_ids(&id);
    render(
        state
            .catalog()
            .list_related(dimension.into(), &ids, spec)
            .await?,
    )
}

async fn search_dimension(
    dimension: Dimension,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let spec = params.into_spec()?;
    render(state.catalog().search(dimension.into(), spec).await?)
}
