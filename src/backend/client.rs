//! # Backend Client
//!
//! Thin async wrapper over `reqwest` for the two backend endpoints the relay uses:
//! - `POST /api/generate`: run a transcription prompt
//! - `GET /api/tags`: list installed models (health probe)
//!
//! Both calls carry an explicit per-request timeout taken from configuration.
//! Transport failures come back as [`BackendError`]; a reachable backend that
//! answers badly comes back as a `Rejected` outcome so callers can tell
//! "down" apart from "up but not helpful".

use crate::backend::types::{GenerateResponse, GenerationRequest, TagsResponse};
use crate::config::AppConfig;
use crate::error::BackendError;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest backend error body copied into logs and outcomes.
const MAX_REASON_LEN: usize = 256;

/// Result of a generate call that reached the backend.
#[derive(Debug)]
pub enum GenerateOutcome {
    /// 2xx with a body we could decode
    Completed(GenerateResponse),
    /// Non-2xx, or 2xx with an undecodable body
    Rejected { status: u16, reason: String },
}

/// Result of a model listing that reached the backend.
#[derive(Debug)]
pub enum TagsOutcome {
    Listed(TagsResponse),
    Rejected { status: u16 },
}

/// HTTP client for the inference backend.
///
/// ## Cloning:
/// `reqwest::Client` keeps its connection pool behind an Arc, so cloning this
/// struct is cheap and every clone shares the same pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    generate_timeout: Duration,
    tags_timeout: Duration,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("voxtral-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend_url().to_string(),
            generate_timeout: config.transcription_timeout(),
            tags_timeout: config.health_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit a generation request and classify the reply.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerateOutcome, BackendError> {
        let url = self.endpoint("/api/generate");
        debug!(
            url = %url,
            model = %request.model,
            prompt_bytes = request.prompt.len(),
            "Submitting generation request"
        );

        let response = self
            .http
            .post(&url)
            .timeout(self.generate_timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let reason = truncate(&String::from_utf8_lossy(&body));
            warn!(status = status.as_u16(), reason = %reason, "Backend rejected generation request");
            return Ok(GenerateOutcome::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        match serde_json::from_slice::<GenerateResponse>(&body) {
            Ok(parsed) => {
                debug!(
                    model = parsed.model.as_deref().unwrap_or(&request.model),
                    done = parsed.done,
                    chars = parsed.response.len(),
                    "Generation completed"
                );
                Ok(GenerateOutcome::Completed(parsed))
            }
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "Backend returned an unparseable generation body");
                Ok(GenerateOutcome::Rejected {
                    status: status.as_u16(),
                    reason: format!("unparseable response: {}", e),
                })
            }
        }
    }

    /// List the models installed on the backend.
    ///
    /// Unlike [`generate`](Self::generate), an undecodable 2xx body is an error here:
    /// the health probe has nothing useful to report without the list.
    pub async fn list_models(&self) -> Result<TagsOutcome, BackendError> {
        let url = self.endpoint("/api/tags");

        let response = self
            .http
            .get(&url)
            .timeout(self.tags_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(TagsOutcome::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let tags = serde_json::from_slice::<TagsResponse>(&body)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        Ok(TagsOutcome::Listed(tags))
    }
}

fn truncate(text: &str) -> String {
    let text = text.trim();
    if text.len() <= MAX_REASON_LEN {
        return text.to_string();
    }
    let mut end = MAX_REASON_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: &str) -> BackendClient {
        let mut config = AppConfig::default();
        config.backend.base_url = base_url.to_string();
        config.backend.transcription_timeout_secs = 2;
        config.backend.health_timeout_secs = 1;
        BackendClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "voxtral-mini-q4",
                "stream": false,
                "options": { "temperature": 0.0, "top_k": 1 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "voxtral-mini-q4",
                "response": "hello world",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let request = GenerationRequest::transcription("voxtral-mini-q4", "AAAA");
        let outcome = client.generate(&request).await.unwrap();

        match outcome {
            GenerateOutcome::Completed(response) => assert_eq!(response.response, "hello world"),
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_non_success_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'voxtral-mini-q4' not found"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let request = GenerationRequest::transcription("voxtral-mini-q4", "AAAA");
        let outcome = client.generate(&request).await.unwrap();

        match outcome {
            GenerateOutcome::Rejected { status, reason } => {
                assert_eq!(status, 404);
                assert!(reason.contains("not found"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_unparseable_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let request = GenerationRequest::transcription("voxtral-mini-q4", "AAAA");
        let outcome = client.generate(&request).await.unwrap();

        assert!(matches!(outcome, GenerateOutcome::Rejected { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_generate_connection_refused() {
        // Port 1 is reserved; nothing listens there.
        let client = client_for("http://127.0.0.1:1");
        let request = GenerationRequest::transcription("voxtral-mini-q4", "AAAA");
        let err = client.generate(&request).await.unwrap_err();

        assert!(matches!(err, BackendError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_generate_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(serde_json::json!({ "response": "late" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let request = GenerationRequest::transcription("voxtral-mini-q4", "AAAA");
        let err = client.generate(&request).await.unwrap_err();

        assert!(matches!(err, BackendError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": "voxtral-mini-q4" }, { "name": "llama3" }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&format!("{}/", server.uri()));
        match client.list_models().await.unwrap() {
            TagsOutcome::Listed(tags) => {
                let names: Vec<_> = tags.models.iter().map(|m| m.name.as_str()).collect();
                assert_eq!(names, vec!["voxtral-mini-q4", "llama3"]);
            }
            other => panic!("expected listing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_models_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.list_models().await.unwrap_err();
        assert!(matches!(err, BackendError::MalformedResponse(_)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate(&long);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= MAX_REASON_LEN + 3);
    }
}
