//! # Error Handling
//!
//! This module defines the relay's error types and how they become HTTP responses.
//!
//! ## Two error families:
//! - **AppError**: failures while handling an inbound request. Only `MissingInput`
//!   ever reaches a client as an error status from the transcription endpoint; the
//!   handler turns every other variant into a degraded 200 result.
//! - **BackendError**: failures talking to the inference backend. These are never
//!   surfaced as a transport status; callers fold them into degraded payloads.
//!
//! ## Rust Concepts:
//! - **From trait**: `?` converts library errors into our own types automatically
//! - **ResponseError trait**: actix-web calls `error_response` for handler errors
//! - **Display trait**: the human-readable message that ends up in logs and payloads

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Message returned to clients when no audio was supplied on any channel.
pub const MISSING_INPUT_MESSAGE: &str = "No audio data provided";

/// Custom error types for request handling.
///
/// ## Error Categories:
/// - **MissingInput**: No audio in any accepted form (400)
/// - **BadRequest**: Client sent a body we could not read (400)
/// - **Internal**: Server-side problems such as temp file I/O (500)
#[derive(Debug)]
pub enum AppError {
    /// No audio payload in the upload, JSON body, or form field
    MissingInput,

    /// Client sent invalid or malformed data
    BadRequest(String),

    /// Internal server errors (file system, blocking pool, etc.)
    Internal(String),
}

impl AppError {
    /// Machine-readable error type used in JSON bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MissingInput => "missing_input",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingInput => write!(f, "{}", MISSING_INPUT_MESSAGE),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts request errors into HTTP responses.
///
/// ## JSON Response Format:
/// The body keeps `error` as a plain string so existing clients that read
/// `response.error` keep working:
/// ```json
/// {
///   "error": "No audio data provided",
///   "type": "missing_input",
///   "timestamp": "2025-01-01T12:00:00Z"
/// }
/// ```
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingInput | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
            "type": self.kind(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }
}

/// Lets `?` on file operations inside handlers produce an `AppError::Internal`.
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("I/O error: {}", err))
    }
}

/// Type alias for Results that use our request error type.
pub type AppResult<T> = Result<T, AppError>;

/// Failures communicating with the inference backend.
///
/// ## Classification:
/// - **Unreachable**: connection refused, DNS failure, TLS errors, etc.
/// - **Timeout**: the configured timeout elapsed before a reply arrived
/// - **MalformedResponse**: the reply could not be decoded into the expected shape
#[derive(Debug)]
pub enum BackendError {
    Unreachable(String),
    Timeout(String),
    MalformedResponse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Unreachable(msg) => write!(f, "backend unreachable: {}", msg),
            BackendError::Timeout(msg) => write!(f, "backend timed out: {}", msg),
            BackendError::MalformedResponse(msg) => write!(f, "malformed backend response: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(err.to_string())
        } else if err.is_decode() {
            BackendError::MalformedResponse(err.to_string())
        } else {
            BackendError::Unreachable(err.to_string())
        }
    }
}
