//! Model registry, metadata and cache path resolution.
//!
//! [`MODELS`] is the fixed, enumerated set of speech models the transcriber
//! accepts; nothing outside this list can be requested.  [`ModelPaths`]
//! resolves where a model's GGML weights live (or will land) on disk — the
//! weights cache is keyed purely by model identifier.

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ModelInfo
// ---------------------------------------------------------------------------

/// Static metadata for a single GGML speech model.
#[derive(Debug)]
pub struct ModelInfo {
    /// Unique identifier used by callers (e.g. `"whisper-small-pt"`).
    pub id: &'static str,
    /// Human-readable name shown by `--list-models`.
    pub display_name: &'static str,
    /// File name under the models cache directory.
    pub file_name: &'static str,
    /// Approximate download size in megabytes.
    pub file_size_mb: u64,
    /// Source URL for the GGML weights.
    pub source_url: &'static str,
    /// ISO-639-1 code the model is tuned for, or `"multilingual"`.
    pub language: &'static str,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The fixed model set selectable by the user.
///
/// The first entry is the default: a Portuguese Common-Voice fine-tune of
/// Whisper Small, flanked by the standard multilingual small and large-v3.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "whisper-small-pt",
        display_name: "Whisper Small PT (Common Voice 17 fine-tune)",
        file_name: "ggml-whisper-small-pt.bin",
        file_size_mb: 487,
        source_url: "https://huggingface.co/deepdml/whisper-small-pt-cv17/resolve/main/ggml-model.bin",
        language: "pt",
    },
    ModelInfo {
        id: "whisper-small",
        display_name: "Whisper Small (Multilingual)",
        file_name: "ggml-small.bin",
        file_size_mb: 488,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin",
        language: "multilingual",
    },
    ModelInfo {
        id: "whisper-large-v3",
        display_name: "Whisper Large-v3 (Multilingual)",
        file_name: "ggml-large-v3.bin",
        file_size_mb: 3_100,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin",
        language: "multilingual",
    },
];

/// Identifier of the model used when the caller does not pick one.
pub const DEFAULT_MODEL_ID: &str = "whisper-small-pt";

/// Find a [`ModelInfo`] by its `id` string.
pub fn find_model_by_id(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == id)
}

// ---------------------------------------------------------------------------
// ModelPaths
// ---------------------------------------------------------------------------

/// Resolves the on-disk location of cached model weights.
///
/// ```rust
/// use audio_to_text::stt::{ModelPaths, MODELS};
///
/// let paths = ModelPaths::new("/tmp/models");
/// let p = paths.model_path(&MODELS[0]);
/// assert!(p.ends_with("ggml-whisper-small-pt.bin"));
/// ```
#[derive(Debug, Clone)]
pub struct ModelPaths {
    /// Directory that contains (or will contain) GGML `.bin` files.
    pub models_dir: PathBuf,
}

impl ModelPaths {
    const APP_NAME: &'static str = "audio-to-text";

    /// The platform's per-user data directory, e.g.
    /// `~/.local/share/audio-to-text/models` on Linux.
    ///
    /// Falls back to `./models` when the platform provides no standard
    /// location.
    pub fn user_default() -> Self {
        let models_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME)
            .join("models");
        Self { models_dir }
    }

    /// Construct directly from a models directory path (useful in tests).
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Full path to the GGML file for the given model.
    pub fn model_path(&self, model: &ModelInfo) -> PathBuf {
        self.models_dir.join(model.file_name)
    }

    /// Returns `true` if the model's weights are already cached on disk.
    pub fn is_cached(&self, model: &ModelInfo) -> bool {
        self.model_path(model).exists()
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self::user_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_ids_are_unique() {
        for (i, a) in MODELS.iter().enumerate() {
            for b in &MODELS[i + 1..] {
                assert_ne!(a.id, b.id, "duplicate model id {}", a.id);
            }
        }
    }

    #[test]
    fn registry_file_names_are_unique() {
        for (i, a) in MODELS.iter().enumerate() {
            for b in &MODELS[i + 1..] {
                assert_ne!(a.file_name, b.file_name);
            }
        }
    }

    #[test]
    fn default_model_exists_in_registry() {
        let m = find_model_by_id(DEFAULT_MODEL_ID);
        assert!(m.is_some());
        assert_eq!(m.unwrap().language, "pt");
    }

    #[test]
    fn find_model_by_id_unknown() {
        assert!(find_model_by_id("does-not-exist").is_none());
    }

    #[test]
    fn source_urls_look_sane() {
        for m in MODELS {
            assert!(m.source_url.starts_with("https://"), "{}", m.id);
            assert!(m.file_size_mb > 0, "{}", m.id);
        }
    }

    #[test]
    fn model_path_joins_file_name() {
        let paths = ModelPaths::new("/models");
        let p = paths.model_path(&MODELS[1]);
        assert!(p.to_str().unwrap().ends_with("ggml-small.bin"));
    }

    #[test]
    fn missing_model_is_not_cached() {
        let paths = ModelPaths::new("/nonexistent/path");
        assert!(!paths.is_cached(&MODELS[0]));
    }

    #[test]
    fn user_default_is_non_empty() {
        let paths = ModelPaths::user_default();
        assert!(paths.models_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.models_dir.ends_with("models"));
    }
}
