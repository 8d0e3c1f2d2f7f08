//! # Application State
//!
//! Shared, read-only state handed to every request handler through
//! `web::Data<AppState>`.
//!
//! ## Key Rust Concepts:
//!
//! ### Arc (Atomically Reference Counted)
//! - **Purpose**: Lets every worker thread hold the same configuration without copying it
//! - **Immutability**: The config is built once at startup; there is no lock because
//!   nothing ever writes to it
//!
//! ### Clone-per-worker
//! actix-web builds one `App` per worker thread, so `AppState` is cloned once
//! per worker. Every field is either `Arc`, `Copy`, or internally pooled, which
//! keeps those clones cheap.

use crate::backend::BackendClient;
use crate::config::AppConfig;
use crate::transcription::ModelCatalog;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration, immutable after startup
    pub config: Arc<AppConfig>,

    /// Model table with the default selection already resolved
    pub catalog: ModelCatalog,

    /// HTTP client for the inference backend (shares one connection pool)
    pub backend: BackendClient,

    /// When the server started
    pub start_time: Instant,
}

impl AppState {
    /// Build the shared state from a validated configuration.
    ///
    /// Fails only if the HTTP client cannot be constructed (e.g. no TLS backend).
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let catalog = ModelCatalog::new(&config.models.default_model);
        let backend = BackendClient::new(&config)?;

        Ok(Self {
            config: Arc::new(config),
            catalog,
            backend,
            start_time: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
