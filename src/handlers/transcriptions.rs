//! # Transcription Endpoint
//!
//! `POST /v1/audio/transcriptions`
//!
//! ## Accepted bodies:
//! - `multipart/form-data` with a `file` part (and/or an `audio` text part)
//! - `application/json`: `{ "audio": "<base64>", "model": "mini_q4" }`
//! - `application/x-www-form-urlencoded`: `audio=<base64>`
//!
//! ## Response:
//! ```json
//! {
//!   "text": "hello world",
//!   "confidence": 0.95,
//!   "language": "en",
//!   "model_used": "voxtral-mini-q4"
//! }
//! ```
//! 200 for every handled case; 400 only when no audio was supplied.

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::transcription::{relay, IncomingAudio, TranscriptionResult};
use actix_multipart::{Field, Multipart};
use actix_web::{dev, web, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures_util::stream::StreamExt;
use serde::Deserialize;
use tracing::{error, warn};

/// JSON request body.
#[derive(Debug, Deserialize)]
pub struct TranscriptionJsonBody {
    pub audio: Option<String>,
    pub model: Option<String>,
}

/// Urlencoded request body.
#[derive(Debug, Deserialize)]
pub struct TranscriptionFormBody {
    pub audio: Option<String>,
}

pub async fn create_transcription(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let limit = state.config.uploads.max_payload_bytes;

    let incoming = match read_incoming(&req, payload.into_inner(), limit).await {
        Ok(incoming) => incoming,
        Err(e) => {
            error!(error = %e, content_type = %req.content_type(), "Could not read transcription request body");
            return Ok(HttpResponse::Ok().json(TranscriptionResult::failed(e)));
        }
    };

    match relay(&state, incoming).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => {
            warn!(error = %e, content_type = %req.content_type(), "Rejected transcription request");
            Err(e)
        }
    }
}

/// Read whichever body shape the content type announces.
///
/// Unknown or missing content types yield an empty [`IncomingAudio`], which the
/// relay reports as missing input.
async fn read_incoming(req: &HttpRequest, mut payload: dev::Payload, limit: usize) -> AppResult<IncomingAudio> {
    let content_type = req.content_type().to_ascii_lowercase();

    match content_type.as_str() {
        "multipart/form-data" => read_multipart(Multipart::new(req.headers(), payload), limit).await,
        "application/x-www-form-urlencoded" => {
            let form = web::Form::<TranscriptionFormBody>::from_request(req, &mut payload)
                .await
                .map_err(|e| AppError::BadRequest(format!("Form parsing error: {}", e)))?
                .into_inner();
            Ok(IncomingAudio {
                form: form.audio.filter(|audio| !audio.is_empty()),
                ..Default::default()
            })
        }
        ct if ct == "application/json" || ct.ends_with("+json") => {
            let body = web::Json::<TranscriptionJsonBody>::from_request(req, &mut payload)
                .await
                .map_err(|e| AppError::BadRequest(format!("JSON parsing error: {}", e)))?
                .into_inner();
            Ok(IncomingAudio {
                inline: body.audio,
                model: body.model,
                ..Default::default()
            })
        }
        _ => Ok(IncomingAudio::default()),
    }
}

/// Collect the `file` and `audio` parts of a multipart body, ignoring everything else.
async fn read_multipart(mut multipart: Multipart, limit: usize) -> AppResult<IncomingAudio> {
    let mut incoming = IncomingAudio::default();
    let mut received = 0usize;

    while let Some(item) = multipart.next().await {
        let mut field: Field = item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let (field_name, has_filename) = match field.content_disposition() {
            Some(cd) => match cd.get_name() {
                Some(name) => (name.to_string(), cd.get_filename().is_some()),
                None => continue,
            },
            None => continue,
        };

        match field_name.as_str() {
            // A `file` part without a filename is a plain text field, not an upload.
            "file" if has_filename && incoming.file.is_none() => {
                incoming.file = Some(read_field(&mut field, &mut received, limit).await?);
            }
            "audio" if incoming.form.is_none() => {
                let bytes = read_field(&mut field, &mut received, limit).await?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| AppError::BadRequest("audio field is not valid UTF-8".to_string()))?;
                if !text.is_empty() {
                    incoming.form = Some(text);
                }
            }
            // Unread fields are drained when the next one is requested.
            _ => {}
        }
    }

    Ok(incoming)
}

async fn read_field(field: &mut Field, received: &mut usize, limit: usize) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Chunk error: {}", e)))?;
        *received += chunk.len();
        if *received > limit {
            return Err(AppError::BadRequest(format!(
                "Payload too large: more than {} bytes",
                limit
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
