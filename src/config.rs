//! # Configuration Management
//!
//! This module loads the relay's configuration from multiple sources:
//! - TOML configuration files (config.toml)
//! - Environment variables (with APP_ prefix, `__` between sections)
//! - A handful of well-known variables (HOST, PORT, VOXTRAL_MODEL, OLLAMA_BASE_URL)
//! - Default values (built into the code)
//!
//! ## Key Rust Concepts Used:
//! - **Serde**: Serialization/deserialization between Rust structs and data formats
//! - **derive macros**: Automatically generate Debug, Clone, Serialize, Deserialize
//! - **Option<T>**: Settings that may legitimately be absent (e.g. upload directory)
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Well-known environment variables (HOST, PORT, VOXTRAL_MODEL, OLLAMA_BASE_URL)
//! 2. Prefixed environment variables (APP_SERVER__PORT, APP_BACKEND__BASE_URL, etc.)
//! 3. Configuration file (config.toml)
//! 4. Default values (defined in the Default impl)
//!
//! The configuration is built once at startup and never mutated afterwards.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration that contains all settings.
///
/// ## Why separate config structs:
/// Breaking configuration into logical groups (server, backend, models, uploads)
/// keeps each concern small and lets `config.toml` mirror the same sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub models: ModelsConfig,
    pub uploads: UploadsConfig,
}

/// Server-specific configuration settings.
///
/// ## Common values:
/// - `host = "127.0.0.1"`: Only accept connections from localhost
/// - `host = "0.0.0.0"`: Accept connections from any IP address (the default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Inference backend (Ollama) connection settings.
///
/// ## Fields:
/// - `base_url`: Root URL of the backend, without a trailing path (e.g. "http://localhost:11434")
/// - `transcription_timeout_secs`: Upper bound for a single `/api/generate` call
/// - `health_timeout_secs`: Upper bound for the `/api/tags` probe used by `/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub transcription_timeout_secs: u64,
    pub health_timeout_secs: u64,
}

/// Model selection settings.
///
/// `default_model` is a logical key from the model catalog ("mini", "mini_ft",
/// "mini_q4", "mini_q8"), not a backend identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub default_model: String,
}

/// Request payload and upload staging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory used for temporary upload files. `None` means the system temp dir.
    pub temp_dir: Option<PathBuf>,
    /// Largest request body accepted on any of the three audio channels.
    pub max_payload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            backend: BackendConfig {
                base_url: "http://localhost:11434".to_string(),
                transcription_timeout_secs: 120,
                health_timeout_secs: 5,
            },
            models: ModelsConfig {
                default_model: "mini".to_string(),
            },
            uploads: UploadsConfig {
                temp_dir: None,
                max_payload_bytes: 50 * 1024 * 1024,  // 50MB, enough for several minutes of WAV
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources in priority order.
    ///
    /// ## Configuration Loading Process:
    /// 1. Start with built-in defaults
    /// 2. Override with values from config.toml (if it exists)
    /// 3. Override with environment variables prefixed with APP_
    /// 4. Handle the well-known variables deployment scripts already use
    ///
    /// ## Environment Variable Examples:
    /// - `APP_SERVER__PORT=3000`: Override server port
    /// - `APP_BACKEND__TRANSCRIPTION_TIMEOUT_SECS=60`: Tighten the generate timeout
    /// - `VOXTRAL_MODEL=mini_q4`: Select the 4-bit quantized model by default
    /// - `OLLAMA_BASE_URL=http://gpu-box:11434`: Point at a remote backend
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // required(false) means "don't error if missing"
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let overrides = [
            ("HOST", "server.host"),
            ("PORT", "server.port"),
            ("VOXTRAL_MODEL", "models.default_model"),
            ("OLLAMA_BASE_URL", "backend.base_url"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = env::var(var) {
                settings = settings.set_override(key, value)?;
            }
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    ///
    /// ## What this checks:
    /// - Server port is not 0
    /// - Backend URL is an http(s) URL
    /// - Both backend timeouts are non-zero
    /// - Payload limit is non-zero
    ///
    /// An unknown `default_model` is deliberately not rejected here; the model
    /// catalog falls back to "mini" and logs a warning instead.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow::anyhow!("Backend base URL cannot be empty"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "Backend base URL must start with http:// or https://, got '{}'",
                base_url
            ));
        }

        if self.backend.transcription_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Transcription timeout must be greater than 0"));
        }

        if self.backend.health_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Health check timeout must be greater than 0"));
        }

        if self.uploads.max_payload_bytes == 0 {
            return Err(anyhow::anyhow!("Max payload size must be greater than 0"));
        }

        Ok(())
    }

    /// Backend base URL with any trailing slash removed, ready for path joins.
    pub fn backend_url(&self) -> &str {
        self.backend.base_url.trim().trim_end_matches('/')
    }

    pub fn transcription_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.transcription_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.health_timeout_secs)
    }

    /// Directory for staging uploaded audio files.
    pub fn upload_dir(&self) -> PathBuf {
        self.uploads
            .temp_dir
            .clone()
            .unwrap_or_else(env::temp_dir)
    }
}
