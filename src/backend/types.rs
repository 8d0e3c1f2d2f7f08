//! Wire types for the Ollama-compatible inference backend.

use serde::{Deserialize, Serialize};

/// Instruction appended after the audio section of every transcription prompt.
pub const TRANSCRIBE_INSTRUCTION: &str = "Transcribe this audio accurately. Return only the spoken text without any additional formatting or explanations.";

/// Decoding parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
    pub max_tokens: u32,
}

impl GenerationOptions {
    /// Deterministic decoding for transcription. Not caller-overridable.
    pub const TRANSCRIPTION: Self = Self {
        temperature: 0.0,   // greedy: same audio, same text
        top_p: 1.0,
        top_k: 1,
        repeat_penalty: 1.0, // speech legitimately repeats words
        max_tokens: 2048,
    };
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    /// Build a non-streaming transcription request for `backend_model`.
    ///
    /// `audio_base64` is embedded verbatim; it is expected to be standard base64.
    pub fn transcription(backend_model: &str, audio_base64: &str) -> Self {
        Self {
            model: backend_model.to_string(),
            prompt: transcription_prompt(audio_base64),
            stream: false,
            options: GenerationOptions::TRANSCRIPTION,
        }
    }
}

/// Wrap the audio in an `<audio>` section followed by the transcription instruction.
pub fn transcription_prompt(audio_base64: &str) -> String {
    format!("<audio>{}</audio>\n\n{}", audio_base64, TRANSCRIBE_INSTRUCTION)
}

/// Body of a non-streaming `/api/generate` reply.
///
/// Only `response` is required. Ollama does not report language or confidence,
/// but some Voxtral front-ends do, so both are read when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Body of `GET /api/tags`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One installed model as listed by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelTag {
    #[serde(default)]
    pub name: String,
}
