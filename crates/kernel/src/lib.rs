//! Perfumery Kernel Library
//!
//! This library exposes the catalog engine and HTTP surface for integration
//! testing. The main entry point for running the server is the `perfumery`
//! binary.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
