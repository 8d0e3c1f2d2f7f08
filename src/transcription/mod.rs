//! # Transcription Module
//!
//! Relays speech-to-text requests to the inference backend. No recognition
//! happens here; this module only shapes requests and responses.
//!
//! ## Key Components:
//! - **Model Catalog**: Logical model keys and the default selection
//! - **Audio Extraction**: Picking one of the three audio channels and encoding it
//! - **Relay**: Forwarding to the backend and applying the fallback policy
//! - **Result**: The normalized body returned to clients

pub mod audio;
pub mod catalog;
pub mod relay;
pub mod result;

pub use audio::IncomingAudio;
pub use catalog::ModelCatalog;
pub use relay::relay;
pub use result::TranscriptionResult;
