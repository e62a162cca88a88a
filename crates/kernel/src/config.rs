//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

use crate::catalog::DEFAULT_MAX_PAGE_SIZE;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Public base URL used in links (default: http://localhost:{port}).
    pub base_url: String,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Largest page a caller may request (default: 100).
    pub max_page_size: i64,

    /// Per-query statement timeout in seconds (default: 10).
    pub statement_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let base_url = env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let max_page_size: i64 = env::var("MAX_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_MAX_PAGE_SIZE.to_string())
            .parse()
            .context("MAX_PAGE_SIZE must be a valid integer")?;
        if max_page_size < 1 {
            anyhow::bail!("MAX_PAGE_SIZE must be at least 1, got {max_page_size}");
        }

        let statement_timeout_secs = env::var("STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("STATEMENT_TIMEOUT_SECS must be a valid u64")?;

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            base_url,
            cors_allowed_origins,
            max_page_size,
            statement_timeout_secs,
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
