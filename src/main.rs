//! # Voxtral Relay - Main Application Entry Point
//!
//! HTTP relay in front of a local Ollama backend serving Voxtral speech models.
//! Clients post audio; the relay forwards it as a deterministic generation
//! request and returns the recognized text.
//!
//! ## Application Architecture:
//! - **config**: Layered configuration (defaults, config.toml, environment)
//! - **state**: Immutable shared state (config, model catalog, backend client)
//! - **backend**: Typed client for the Ollama HTTP API
//! - **transcription**: Audio extraction, model selection, relay and fallback policy
//! - **handlers**: HTTP handlers for the transcription and model endpoints
//! - **health**: Backend-aware health reporting
//! - **middleware**: Request logging
//! - **error**: Error types and their HTTP mapping

mod backend;
mod config;
mod error;
mod handlers;
mod health;
mod middleware;
mod state;
mod transcription;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use crate::config::AppConfig;
use crate::state::AppState;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The main application entry point.
///
/// ## What this function does:
/// 1. **Loads configuration** from files and environment variables
/// 2. **Sets up logging**
/// 3. **Creates shared application state** (config, model catalog, backend client)
/// 4. **Configures the HTTP server** with middleware and routes
/// 5. **Handles graceful shutdown** on SIGINT/SIGTERM
#[actix_web::main]
async fn main() -> Result<()> {
    // .ok() means "ignore errors" - it's fine if there's no .env file
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting voxtral-relay v{}", env!("CARGO_PKG_VERSION"));

    let app_state = AppState::new(config.clone())?;
    info!(
        backend = %app_state.backend.base_url(),
        model = app_state.catalog.default_entry().identifier,
        transcription_timeout_secs = config.backend.transcription_timeout_secs,
        "Relaying to inference backend"
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on {}", bind_addr);

    let route_config = config.clone();
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::RequestLogging)
            .configure(|cfg| configure_routes(cfg, &route_config))
    })
    // The relay installs its own signal handling below.
    .disable_signals()
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    // Whichever finishes first wins: the server (usually an error) or a shutdown signal
    tokio::select! {
        result = server_task => {
            match result {
                Ok(Err(e)) => error!("Server error: {}", e),
                Err(e) => error!("Server task error: {}", e),
                Ok(Ok(())) => {}
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Register routes and body-size limits.
///
/// Shared by `main` and the handler tests so both exercise the same routing table.
pub fn configure_routes(cfg: &mut web::ServiceConfig, config: &AppConfig) {
    let limit = config.uploads.max_payload_bytes;

    cfg.app_data(web::JsonConfig::default().limit(limit))
        .app_data(web::FormConfig::default().limit(limit))
        .route(
            "/v1/audio/transcriptions",
            web::post().to(handlers::create_transcription),
        )
        .route("/v1/models", web::get().to(handlers::list_models))
        .route("/health", web::get().to(health::health_check));
}

/// Initialize the tracing (logging) system.
///
/// ## Environment Variables:
/// - `RUST_LOG`: Controls what gets logged (e.g., "debug", "voxtral_relay=trace")
/// - If not set, defaults to "voxtral_relay=debug,actix_web=info"
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voxtral_relay=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}

/// Resolve when SIGINT (Ctrl+C) or, on Unix, SIGTERM arrives.
///
/// If a handler cannot be installed, that branch never resolves and a warning
/// is logged; the other signal still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install SIGINT handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received SIGINT");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
