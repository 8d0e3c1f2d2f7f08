//! # Audio Payload Extraction
//!
//! A transcription request can carry audio three ways. This module picks one
//! and turns it into the base64 string the backend expects.
//!
//! ## Precedence:
//! 1. **FileUpload**: multipart part named `file` (raw bytes)
//! 2. **InlineBase64**: JSON body field `audio`
//! 3. **FormField**: form field `audio` (urlencoded, or a multipart text part)
//!
//! The first source present wins, even if it turns out to be empty; the
//! others are ignored.
//!
//! ## Upload staging:
//! Uploaded bytes are written to a scoped temporary file, read back, and
//! encoded. The file is a `tempfile::NamedTempFile`, so it is removed when
//! the guard drops on every exit path, including early `?` returns.

use crate::error::{AppError, AppResult};
use actix_web::web;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a request body carried, before precedence is applied.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IncomingAudio {
    /// Bytes of the multipart `file` part
    pub file: Option<Vec<u8>>,
    /// `audio` from a JSON body
    pub inline: Option<String>,
    /// `audio` from form data
    pub form: Option<String>,
    /// Requested model key (JSON body only)
    pub model: Option<String>,
}

impl IncomingAudio {
    /// Apply the channel precedence. `None` means no channel carried audio at all.
    pub fn into_source(self) -> Option<AudioSource> {
        if let Some(bytes) = self.file {
            Some(AudioSource::FileUpload(bytes))
        } else if let Some(encoded) = self.inline {
            Some(AudioSource::InlineBase64(encoded))
        } else {
            self.form.map(AudioSource::FormField)
        }
    }
}

/// The audio channel chosen for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    FileUpload(Vec<u8>),
    InlineBase64(String),
    FormField(String),
}

impl AudioSource {
    pub fn channel(&self) -> &'static str {
        match self {
            AudioSource::FileUpload(_) => "file",
            AudioSource::InlineBase64(_) => "json",
            AudioSource::FormField(_) => "form",
        }
    }

    /// Resolve to a base64 payload. Empty audio on the chosen channel is `MissingInput`.
    pub async fn into_payload(self, upload_dir: PathBuf) -> AppResult<AudioPayload> {
        match self {
            AudioSource::FileUpload(bytes) => {
                if bytes.is_empty() {
                    return Err(AppError::MissingInput);
                }
                let encoded = web::block(move || stage_upload(&bytes, &upload_dir))
                    .await
                    .map_err(|e| AppError::Internal(format!("blocking pool error: {}", e)))??;
                AudioPayload::new(encoded)
            }
            AudioSource::InlineBase64(encoded) | AudioSource::FormField(encoded) => {
                AudioPayload::new(encoded)
            }
        }
    }
}

/// Base64-encoded audio ready to embed in a prompt. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload(String);

impl AudioPayload {
    pub fn new(encoded: String) -> AppResult<Self> {
        if encoded.trim().is_empty() {
            return Err(AppError::MissingInput);
        }
        Ok(Self(encoded))
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }

    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

/// Persist an upload to a scoped temp file in `dir`, read it back, and base64-encode it.
///
/// Blocking; run it on the blocking pool.
pub fn stage_upload(bytes: &[u8], dir: &Path) -> std::io::Result<String> {
    let mut staged = tempfile::Builder::new()
        .prefix("voxtral-upload-")
        .suffix(".wav")
        .tempfile_in(dir)?;

    staged.write_all(bytes)?;
    staged.flush()?;
    debug!(path = %staged.path().display(), bytes = bytes.len(), "Staged upload");

    let mut contents = Vec::with_capacity(bytes.len());
    staged.reopen()?.read_to_end(&mut contents)?;

    // Explicit close so a failed delete surfaces instead of being swallowed by Drop.
    staged.close()?;

    Ok(STANDARD.encode(contents))
}
