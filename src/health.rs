//! # Health Reporting
//!
//! `GET /health` probes the backend's model list and reports whether the relay
//! can actually transcribe. The endpoint always answers 200; degradation is
//! reported in the body so load balancers keep routing to the relay while the
//! backend restarts.

use crate::backend::TagsOutcome;
use crate::state::AppState;
use crate::transcription::catalog::is_voxtral_model;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Connected,
    Disconnected,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: ServiceStatus,

    /// Default model identifier the relay transcribes with
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voxtral_available: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama_status: Option<BackendStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub uptime_seconds: u64,
    pub timestamp: String,
}

impl HealthStatus {
    fn base(status: ServiceStatus, state: &AppState) -> Self {
        Self {
            status,
            model: state.catalog.default_entry().identifier.to_string(),
            voxtral_available: None,
            ollama_status: None,
            models: None,
            message: None,
            error: None,
            uptime_seconds: state.uptime_seconds(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Backend listed its models.
    pub fn healthy(state: &AppState, model_names: Vec<String>) -> Self {
        Self {
            voxtral_available: Some(model_names.iter().any(|name| is_voxtral_model(name))),
            ollama_status: Some(BackendStatus::Connected),
            models: Some(model_names),
            ..Self::base(ServiceStatus::Healthy, state)
        }
    }

    /// Backend answered the probe with a non-success status.
    pub fn disconnected(state: &AppState) -> Self {
        Self {
            ollama_status: Some(BackendStatus::Disconnected),
            message: Some("Ollama not responding, using fallback mode".to_string()),
            ..Self::base(ServiceStatus::Degraded, state)
        }
    }

    /// Backend could not be reached or its reply could not be read.
    pub fn unreachable(state: &AppState, cause: impl std::fmt::Display) -> Self {
        Self {
            error: Some(cause.to_string()),
            message: Some("Running in fallback mode".to_string()),
            ..Self::base(ServiceStatus::Degraded, state)
        }
    }
}

/// Probe the backend and build the health report.
pub async fn check_health(state: &AppState) -> HealthStatus {
    match state.backend.list_models().await {
        Ok(TagsOutcome::Listed(tags)) => {
            let names = tags.models.into_iter().map(|m| m.name).collect();
            HealthStatus::healthy(state, names)
        }
        Ok(TagsOutcome::Rejected { status }) => {
            warn!(status, backend = %state.backend.base_url(), "Backend health probe rejected");
            HealthStatus::disconnected(state)
        }
        Err(e) => {
            warn!(error = %e, backend = %state.backend.base_url(), "Backend health probe failed");
            HealthStatus::unreachable(state, e)
        }
    }
}

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(check_health(&state).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use actix_web::{test, App};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(base_url: &str) -> AppState {
        let mut config = AppConfig::default();
        config.backend.base_url = base_url.to_string();
        config.backend.health_timeout_secs = 1;
        AppState::new(config).unwrap()
    }

    async fn backend_listing(names: &[&str]) -> MockServer {
        let server = MockServer::start().await;
        let models: Vec<_> = names
            .iter()
            .map(|name| serde_json::json!({ "name": name }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": models })))
            .mount(&server)
            .await;
        server
    }

    async fn get_health(state: AppState) -> (u16, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/health", web::get().to(health_check)),
        )
        .await;
        let response = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        let status = response.status().as_u16();
        let body: serde_json::Value = test::read_body_json(response).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_healthy_with_voxtral_listed() {
        let server = backend_listing(&["voxtral-mini-q4", "llama3"]).await;
        let (status, body) = get_health(state_for(&server.uri())).await;

        assert_eq!(status, 200);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["voxtral_available"], true);
        assert_eq!(body["ollama_status"], "connected");
        assert_eq!(body["model"], "mistralai/Voxtral-Mini-3B-2507");
        assert_eq!(body["models"], serde_json::json!(["voxtral-mini-q4", "llama3"]));
    }

    #[actix_web::test]
    async fn test_healthy_without_voxtral() {
        let server = backend_listing(&["llama3"]).await;
        let (status, body) = get_health(state_for(&server.uri())).await;

        assert_eq!(status, 200);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["voxtral_available"], false);
    }

    #[actix_web::test]
    async fn test_uppercase_model_name_counts_as_voxtral() {
        let server = backend_listing(&["VOXTRAL-MINI-FT:latest"]).await;
        let (_, body) = get_health(state_for(&server.uri())).await;
        assert_eq!(body["voxtral_available"], true);
    }

    #[actix_web::test]
    async fn test_degraded_when_backend_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (status, body) = get_health(state_for(&server.uri())).await;

        assert_eq!(status, 200);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["ollama_status"], "disconnected");
        assert!(body["message"].as_str().unwrap().contains("fallback"));
        assert!(body.get("voxtral_available").is_none());
    }

    #[actix_web::test]
    async fn test_degraded_when_backend_unreachable() {
        let (status, body) = get_health(state_for("http://127.0.0.1:1")).await;

        assert_eq!(status, 200);
        assert_eq!(body["status"], "degraded");
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert_eq!(body["message"], "Running in fallback mode");
        assert!(body["model"].is_string());
    }
}
