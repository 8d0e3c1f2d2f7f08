//! # Model Catalog
//!
//! Static table of the Voxtral variants the relay knows about, plus the
//! process-wide default selection. Requests name a logical key ("mini",
//! "mini_q4", ...) and the catalog turns it into the identifier the backend
//! understands.
//!
//! ## Resolution rules:
//! - Known key → its entry
//! - Unknown or missing key → the default entry (never an error)
//! - Unknown *default* key at startup → "mini", with a warning

use tracing::warn;

/// Substring that marks a backend model as a Voxtral (transcription-capable) model.
pub const FAMILY_MARKER: &str = "voxtral";

/// Key used when the configured default is not in the table.
pub const FALLBACK_KEY: &str = "mini";

/// One row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    /// Logical key clients send in the `model` field
    pub key: &'static str,
    /// Full model identifier, possibly namespaced ("mistralai/...")
    pub identifier: &'static str,
    /// Human-readable note shown by `GET /v1/models`
    pub description: &'static str,
}

impl ModelEntry {
    /// Name sent to the backend: the identifier's last path component.
    ///
    /// Ollama does not understand Hugging Face namespaces, so
    /// "mistralai/Voxtral-Mini-3B-2507" becomes "Voxtral-Mini-3B-2507".
    pub fn backend_name(&self) -> &'static str {
        backend_name(self.identifier)
    }
}

/// Strip any namespace from a model identifier.
pub fn backend_name(identifier: &str) -> &str {
    identifier.rsplit('/').next().unwrap_or(identifier)
}

/// Whether a backend-listed model name belongs to the Voxtral family (case-insensitive).
pub fn is_voxtral_model(name: &str) -> bool {
    name.to_lowercase().contains(FAMILY_MARKER)
}

pub static MODELS: [ModelEntry; 4] = [
    ModelEntry {
        key: "mini",
        identifier: "mistralai/Voxtral-Mini-3B-2507",
        description: "Base 3B model (~6GB RAM)",
    },
    ModelEntry {
        key: "mini_ft",
        identifier: "voxtral-mini-ft",
        description: "Fine-tuned variant, better accuracy",
    },
    ModelEntry {
        key: "mini_q4",
        identifier: "voxtral-mini-q4",
        description: "4-bit quantized (~3GB RAM)",
    },
    ModelEntry {
        key: "mini_q8",
        identifier: "voxtral-mini-q8",
        description: "8-bit quantized (~4GB RAM)",
    },
];

/// Look up a key in the static table.
pub fn lookup(key: &str) -> Option<&'static ModelEntry> {
    MODELS.iter().find(|entry| entry.key == key)
}

/// The catalog with its default resolved once at startup.
#[derive(Debug, Clone, Copy)]
pub struct ModelCatalog {
    default: &'static ModelEntry,
}

impl ModelCatalog {
    /// Build the catalog from the configured default key.
    pub fn new(default_key: &str) -> Self {
        let default = match lookup(default_key) {
            Some(entry) => entry,
            None => {
                warn!(
                    requested = %default_key,
                    fallback = FALLBACK_KEY,
                    "Unknown default model key, falling back"
                );
                Self::fallback_entry()
            }
        };

        Self { default }
    }

    fn fallback_entry() -> &'static ModelEntry {
        &MODELS[0]
    }

    pub fn default_entry(&self) -> &'static ModelEntry {
        self.default
    }

    /// Resolve a requested key. Missing or unknown keys resolve to the default.
    pub fn select(&self, requested: Option<&str>) -> &'static ModelEntry {
        requested.and_then(lookup).unwrap_or(self.default)
    }

    pub fn entries(&self) -> &'static [ModelEntry] {
        &MODELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_resolve() {
        let catalog = ModelCatalog::new("mini");
        assert_eq!(catalog.select(Some("mini_q4")).identifier, "voxtral-mini-q4");
        assert_eq!(catalog.select(Some("mini_q8")).identifier, "voxtral-mini-q8");
        assert_eq!(catalog.select(Some("mini_ft")).identifier, "voxtral-mini-ft");
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        let catalog = ModelCatalog::new("mini_q4");
        assert_eq!(catalog.select(Some("bogus")).key, "mini_q4");
        assert_eq!(catalog.select(None).key, "mini_q4");
        // Keys are case-sensitive, as in the table
        assert_eq!(catalog.select(Some("MINI")).key, "mini_q4");
    }

    #[test]
    fn test_unknown_default_uses_mini() {
        let catalog = ModelCatalog::new("large_v9");
        assert_eq!(catalog.default_entry().key, FALLBACK_KEY);
        assert_eq!(catalog.default_entry().identifier, "mistralai/Voxtral-Mini-3B-2507");
    }

    #[test]
    fn test_backend_name_strips_namespace() {
        assert_eq!(lookup("mini").unwrap().backend_name(), "Voxtral-Mini-3B-2507");
        assert_eq!(lookup("mini_q4").unwrap().backend_name(), "voxtral-mini-q4");
        assert_eq!(backend_name("a/b/c"), "c");
    }

    #[test]
    fn test_family_detection_is_case_insensitive() {
        assert!(is_voxtral_model("voxtral-mini-q4"));
        assert!(is_voxtral_model("Voxtral-Mini-3B-2507:latest"));
        assert!(!is_voxtral_model("llama3"));
        assert!(!is_voxtral_model(""));
    }
}
