#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Tests run the REAL catalog service and router. Only the store is
//! replaced: [`ScriptedStore`] answers rendered SQL with canned rows and
//! counts, matched by substrings of the query text, and records every
//! query it receives.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use perfumery_kernel::catalog::{CatalogService, LinkAnnotator, StoreGateway};
use perfumery_kernel::{AppState, routes};

/// Base URL used for links in tests.
pub const BASE_URL: &str = "http://perfumery.test";

/// Page size cap used in tests.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Matches the perfume info listing query.
pub const PERFUME_LISTING: &str = "AS \"info_year\"";

/// Matches the perfume count query.
pub const PERFUME_COUNT: &str = "SELECT COUNT(*) FROM \"parfum_info\"";

/// Matches the composition join-row query.
pub const COMPOSITION_ROWS: &str = "AS \"note_uuid\"";

/// Matches the perfume id-only listing used by searches.
pub const PERFUME_IDS: &str = "SELECT \"parfum_info\".\"uuid\" AS \"info_uuid\" FROM \"parfum_info\" INNER JOIN";

/// Matches the listing query of a dimension table.
pub fn dimension_listing(table: &str) -> String {
    format!("AS \"perfums_count\" FROM \"{table}\"")
}

/// Matches the count query of a dimension table.
pub fn dimension_count(table: &str) -> String {
    format!("SELECT COUNT(*) FROM \"{table}\"")
}

#[derive(Debug, Clone)]
enum Answer {
    Rows(Vec<Value>),
    Count(i64),
    Fail(String),
}

#[derive(Debug, Clone)]
struct Rule {
    needles: Vec<String>,
    answer: Answer,
}

/// In-memory store answering queries from a script.
///
/// Rules are tried in registration order; the first rule whose needles all
/// occur in the SQL and whose answer fits the call wins. Unmatched row
/// queries return no rows and unmatched counts return zero.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    rules: Vec<Rule>,
    queries: Mutex<Vec<String>>,
    healthy: bool,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Answer row queries containing every needle.
    pub fn with_rows(mut self, needles: &[&str], rows: Vec<Value>) -> Self {
        self.push(needles, Answer::Rows(rows));
        self
    }

    /// Answer count queries containing every needle.
    pub fn with_count(mut self, needles: &[&str], count: i64) -> Self {
        self.push(needles, Answer::Count(count));
        self
    }

    /// Fail any query containing every needle.
    pub fn failing(mut self, needles: &[&str], message: &str) -> Self {
        self.push(needles, Answer::Fail(message.to_string()));
        self
    }

    /// Report the store as unreachable.
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Every query received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Queries containing `needle`.
    pub fn queries_matching(&self, needle: &str) -> Vec<String> {
        self.queries()
            .into_iter()
            .filter(|q| q.contains(needle))
            .collect()
    }

    fn push(&mut self, needles: &[&str], answer: Answer) {
        self.rules.push(Rule {
            needles: needles.iter().map(|n| n.to_string()).collect(),
            answer,
        });
    }

    fn answer(&self, sql: &str, rows: bool) -> Option<Answer> {
        self.queries.lock().unwrap().push(sql.to_string());
        self.rules
            .iter()
            .filter(|rule| rule.needles.iter().all(|n| sql.contains(n.as_str())))
            .find(|rule| match rule.answer {
                Answer::Rows(_) => rows,
                Answer::Count(_) => !rows,
                Answer::Fail(_) => true,
            })
            .map(|rule| rule.answer.clone())
    }
}

#[async_trait]
impl StoreGateway for ScriptedStore {
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Value>> {
        match self.answer(sql, true) {
            Some(Answer::Rows(rows)) => Ok(rows),
            Some(Answer::Fail(message)) => bail!(message),
            _ => Ok(Vec::new()),
        }
    }

    async fn fetch_count(&self, sql: &str) -> Result<i64> {
        match self.answer(sql, false) {
            Some(Answer::Count(count)) => Ok(count),
            Some(Answer::Fail(message)) => bail!(message),
            _ => Ok(0),
        }
    }

    async fn ping(&self) -> bool {
        self.healthy
    }
}

/// Catalog service over a scripted store.
pub fn catalog(store: ScriptedStore) -> (CatalogService, Arc<ScriptedStore>) {
    let store = Arc::new(store);
    let service = CatalogService::new(store.clone(), LinkAnnotator::new(BASE_URL), MAX_PAGE_SIZE);
    (service, store)
}

/// Test application wrapper using the REAL routes and state.
pub struct TestApp {
    router: Router,
    pub store: Arc<ScriptedStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new(store: ScriptedStore) -> Self {
        let store = Arc::new(store);
        let state = AppState::from_parts(store.clone(), BASE_URL, MAX_PAGE_SIZE);

        // Must match main.rs, minus CORS.
        let router = routes::router()
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .with_state(state.clone());

        Self {
            router,
            store,
            state,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET `uri` and return the status and body text.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.request(request).await;
        let status = response.status();
        (status, body_string(response).await)
    }

    /// GET `uri`, expect 200 and parse the JSON body.
    pub async fn get_json(&self, uri: &str) -> Value {
        let (status, body) = self.get(uri).await;
        assert_eq!(status, StatusCode::OK, "GET {uri} failed: {body}");
        serde_json::from_str(&body).expect("response body is not JSON")
    }
}

/// Read a response body to a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}
