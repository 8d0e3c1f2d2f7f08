//! Transcription result returned to clients.
//!
//! Every handled request produces one of three shapes, always with HTTP 200:
//! - **completed**: the backend produced text
//! - **fallback**: the backend answered but not usefully (`fallback: true`)
//! - **failed**: something went wrong on the way (`error` carries the cause)

use crate::backend::GenerateResponse;
use serde::Serialize;

pub const DEFAULT_CONFIDENCE: f32 = 0.95;
pub const DEFAULT_LANGUAGE: &str = "en";

pub const FALLBACK_TEXT: &str = "[Audio received - Voxtral service processing...]";
pub const FALLBACK_CONFIDENCE: f32 = 0.7;

pub const ERROR_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub confidence: f32,
    pub language: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptionResult {
    /// Map a successful generation into a result, filling in defaults the backend omitted.
    pub fn completed(response: GenerateResponse, model_identifier: &str) -> Self {
        Self {
            text: response.response.trim().to_string(),
            confidence: response
                .confidence
                .map(|c| c.clamp(0.0, 1.0))
                .unwrap_or(DEFAULT_CONFIDENCE),
            language: response
                .language
                .filter(|lang| !lang.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            model_used: Some(model_identifier.to_string()),
            fallback: None,
            error: None,
        }
    }

    /// Backend was reachable but gave no usable transcription.
    pub fn fallback(model_identifier: &str) -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            language: DEFAULT_LANGUAGE.to_string(),
            model_used: Some(model_identifier.to_string()),
            fallback: Some(true),
            error: None,
        }
    }

    /// Any failure other than missing input. The caller still gets a well-formed body.
    pub fn failed(cause: impl std::fmt::Display) -> Self {
        let cause = cause.to_string();
        Self {
            text: format!("[Audio chunk captured - transcription service error: {}]", cause),
            confidence: ERROR_CONFIDENCE,
            language: DEFAULT_LANGUAGE.to_string(),
            model_used: None,
            fallback: None,
            error: Some(cause),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.fallback.unwrap_or(false) || self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_response(text: &str) -> GenerateResponse {
        serde_json::from_value(serde_json::json!({
            "model": "voxtral-mini-q4",
            "response": text,
            "done": true
        }))
        .unwrap()
    }

    #[test]
    fn test_completed_uses_defaults_and_omits_flags() {
        let result = TranscriptionResult::completed(generate_response(" hello world\n"), "voxtral-mini-q4");
        assert_eq!(result.text, "hello world");
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(result.language, "en");
        assert!(!result.is_degraded());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("fallback").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json["model_used"], "voxtral-mini-q4");
    }

    #[test]
    fn test_completed_keeps_backend_supplied_metadata() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "response": "bonjour",
            "language": "fr",
            "confidence": 0.81
        }))
        .unwrap();

        let result = TranscriptionResult::completed(response, "voxtral-mini-ft");
        assert_eq!(result.language, "fr");
        assert!((result.confidence - 0.81).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fallback_shape() {
        let result = TranscriptionResult::fallback("voxtral-mini-q8");
        assert_eq!(result.text, FALLBACK_TEXT);
        assert_eq!(result.fallback, Some(true));
        assert!(result.confidence < 1.0);
        assert!(result.error.is_none());
        assert!(result.is_degraded());
    }

    #[test]
    fn test_failed_shape() {
        let result = TranscriptionResult::failed("connection refused");
        assert_eq!(result.error.as_deref(), Some("connection refused"));
        assert!(result.text.contains("connection refused"));
        assert_eq!(result.confidence, ERROR_CONFIDENCE);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("model_used").is_none());
        assert!(json.get("fallback").is_none());
    }
}
