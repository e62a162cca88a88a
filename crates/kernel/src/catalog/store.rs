//! Store gateway.
//!
//! The catalog treats the relational store purely as a row source: it hands
//! over rendered SQL and gets back JSON rows or a scalar count.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use tracing::debug;

use super::error::{CatalogError, CatalogResult};

/// Executes rendered catalog queries.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// Execute a SELECT and return each row as a JSON object keyed by column
    /// alias.
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<serde_json::Value>>;

    /// Execute a single-column, single-row count query.
    async fn fetch_count(&self, sql: &str) -> Result<i64>;

    /// Whether the store is reachable.
    async fn ping(&self) -> bool;
}

/// PostgreSQL-backed gateway.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    statement_timeout_secs: u64,
}

impl PgStore {
    pub fn new(pool: PgPool, statement_timeout_secs: u64) -> Self {
        Self {
            pool,
            statement_timeout_secs,
        }
    }

    fn timeout_sql(&self) -> String {
        format!(
            "SET LOCAL statement_timeout = '{}s'",
            self.statement_timeout_secs
        )
    }
}

#[async_trait]
impl StoreGateway for PgStore {
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<serde_json::Value>> {
        debug!(sql = %sql, "executing catalog listing query");

        // SET LOCAL only lives until commit/rollback.
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query(&self.timeout_sql())
            .execute(&mut *tx)
            .await
            .context("failed to set statement timeout")?;

        let rows: Vec<serde_json::Value> =
            sqlx::query_scalar(&format!("SELECT row_to_json(t) FROM ({sql}) t"))
                .fetch_all(&mut *tx)
                .await
                .context("failed to execute listing query")?;

        tx.commit()
            .await
            .context("failed to commit query transaction")?;

        Ok(rows)
    }

    async fn fetch_count(&self, sql: &str) -> Result<i64> {
        debug!(sql = %sql, "executing catalog count query");

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query(&self.timeout_sql())
            .execute(&mut *tx)
            .await
            .context("failed to set statement timeout")?;

        let total: i64 = sqlx::query_scalar(sql)
            .fetch_one(&mut *tx)
            .await
            .context("failed to execute count query")?;

        tx.commit()
            .await
            .context("failed to commit query transaction")?;

        Ok(total)
    }

    async fn ping(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}

/// Decode JSON rows into typed rows. A row of the wrong shape is a store
/// error.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<serde_json::Value>) -> CatalogResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| {
                CatalogError::Store(
                    anyhow::Error::new(e).context("store returned a row of unexpected shape"),
                )
            })
        })
        .collect()
}
