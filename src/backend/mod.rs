//! # Inference Backend
//!
//! Everything the relay knows about the Ollama-compatible backend that does the
//! actual speech recognition: request/response wire types and the HTTP client.

pub mod client;
pub mod types;

pub use client::{BackendClient, GenerateOutcome, TagsOutcome};
pub use types::{GenerateResponse, GenerationRequest};
