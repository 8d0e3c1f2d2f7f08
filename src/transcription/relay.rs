//! # Transcription Relay
//!
//! Takes the audio a request carried, forwards it to the backend, and maps
//! whatever happens into a [`TranscriptionResult`].
//!
//! ## Failure policy:
//! - No audio at all → `Err(AppError::MissingInput)`, the only error a caller sees
//! - Backend answered but not usefully → fallback result
//! - Anything else that goes wrong → error result, logged for operators
//!
//! Callers therefore always receive a well-formed body; degradation shows up
//! in the payload, not the status code.

use crate::backend::{GenerateOutcome, GenerationRequest};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::transcription::audio::IncomingAudio;
use crate::transcription::result::TranscriptionResult;
use tracing::{error, info, warn};

/// Relay one transcription request.
pub async fn relay(state: &AppState, incoming: IncomingAudio) -> AppResult<TranscriptionResult> {
    let model = state.catalog.select(incoming.model.as_deref());
    if let Some(requested) = incoming.model.as_deref() {
        if requested != model.key {
            info!(requested = %requested, resolved = model.key, "Unknown model key, using default");
        }
    }

    let source = incoming.into_source().ok_or(AppError::MissingInput)?;
    let channel = source.channel();

    let audio = match source.into_payload(state.config.upload_dir()).await {
        Ok(audio) => audio,
        Err(AppError::MissingInput) => return Err(AppError::MissingInput),
        Err(e) => {
            error!(channel, error = %e, "Failed to prepare audio payload");
            return Ok(TranscriptionResult::failed(e));
        }
    };

    let request = GenerationRequest::transcription(model.backend_name(), audio.as_base64());
    info!(
        channel,
        model = model.identifier,
        audio_b64_len = audio.encoded_len(),
        "Relaying transcription request"
    );

    let result = match state.backend.generate(&request).await {
        Ok(GenerateOutcome::Completed(response)) => {
            TranscriptionResult::completed(response, model.identifier)
        }
        Ok(GenerateOutcome::Rejected { status, reason }) => {
            warn!(status, reason = %reason, model = model.identifier, "Backend gave no usable transcription, returning fallback");
            // Fallbacks report the process default, not the requested model.
            TranscriptionResult::fallback(state.catalog.default_entry().identifier)
        }
        Err(e) => {
            error!(error = %e, model = model.identifier, "Transcription error");
            TranscriptionResult::failed(e)
        }
    };

    info!(
        channel,
        degraded = result.is_degraded(),
        chars = result.text.len(),
        "Transcription finished"
    );
    Ok(result)
}
