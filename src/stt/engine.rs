//! Core ASR engine trait and the whisper.cpp implementation.
//!
//! [`AsrEngine`] is the object-safe interface the pipeline runs against.
//! [`WhisperEngine`] is the production implementation wrapping a
//! `whisper_rs::WhisperContext`; construct it with [`WhisperEngine::load`]
//! after [`crate::stt::ensure_model`] has resolved the weights.
//!
//! [`MockAsrEngine`] (test-only) returns a pre-configured response so the
//! pipeline can be unit-tested without a real GGML file.

use std::path::Path;

use thiserror::Error;
use whisper_rs::{FullParams, WhisperContext, WhisperContextParameters};

use crate::stt::download::ModelLoadError;
use crate::stt::transcribe::{SamplingStrategy, Segment, TranscribeParams, TranscriptionResult};

// ---------------------------------------------------------------------------
// InferenceError
// ---------------------------------------------------------------------------

/// The model could not produce a transcript from the given audio.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    /// The audio buffer is empty — there is nothing to transcribe.
    #[error("audio buffer is empty")]
    EmptyAudio,

    /// A per-call inference state could not be created.
    #[error("whisper state initialisation failed: {0}")]
    StateInit(String),

    /// The inference pass itself failed.
    #[error("transcription failed: {0}")]
    Inference(String),
}

// ---------------------------------------------------------------------------
// AsrEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech-to-text engines.
///
/// # Contract
///
/// - `audio` must be **16 kHz, mono, f32** PCM samples.
/// - Returns `Err(InferenceError::EmptyAudio)` when `audio` is empty.
pub trait AsrEngine: Send + Sync {
    /// Transcribe `audio` under `params` and return the result.
    fn transcribe(
        &self,
        audio: &[f32],
        params: &TranscribeParams,
    ) -> Result<TranscriptionResult, InferenceError>;
}

// Compile-time assertion: Box<dyn AsrEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AsrEngine>) {}
};

// ---------------------------------------------------------------------------
// WhisperEngine
// ---------------------------------------------------------------------------

/// Production ASR engine wrapping a `whisper_rs::WhisperContext`.
///
/// A fresh `WhisperState` is created per [`transcribe`] call, so a loaded
/// engine can be shared across threads without locking.
///
/// [`transcribe`]: AsrEngine::transcribe
pub struct WhisperEngine {
    ctx: WhisperContext,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine").finish_non_exhaustive()
    }
}

// `WhisperContext` holds a raw pointer internally but declares
// `unsafe impl Send`/`Sync` in whisper-rs — the weights are read-only after
// loading.
// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs.
unsafe impl Send for WhisperEngine {}
unsafe impl Sync for WhisperEngine {}

impl WhisperEngine {
    /// Load GGML weights from `model_path` and prepare them for inference.
    ///
    /// The default context parameters request GPU inference; whisper.cpp
    /// falls back to CPU when no accelerated backend is compiled in, so
    /// device selection is automatic and invisible to the caller.
    ///
    /// # Errors
    ///
    /// - [`ModelLoadError::NotFound`] — `model_path` does not exist.
    /// - [`ModelLoadError::ContextInit`] — the file exists but whisper.cpp
    ///   rejected it (corrupt or truncated weights).
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(ModelLoadError::NotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            ModelLoadError::NotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(path_str, ctx_params)
            .map_err(|e| ModelLoadError::ContextInit(e.to_string()))?;

        Ok(Self { ctx })
    }
}

impl AsrEngine for WhisperEngine {
    fn transcribe(
        &self,
        audio: &[f32],
        params: &TranscribeParams,
    ) -> Result<TranscriptionResult, InferenceError> {
        if audio.is_empty() {
            return Err(InferenceError::EmptyAudio);
        }

        // ── Build FullParams ──────────────────────────────────────────────
        use whisper_rs::SamplingStrategy as WS;
        let ws = match params.strategy {
            SamplingStrategy::Greedy { best_of } => WS::Greedy { best_of },
            SamplingStrategy::BeamSearch { beam_size, patience } => {
                WS::BeamSearch { beam_size, patience }
            }
        };

        let mut fp = FullParams::new(ws);

        let lang: Option<&str> = if params.language == "auto" {
            None
        } else {
            Some(params.language.as_str())
        };
        fp.set_language(lang);
        fp.set_n_threads(params.n_threads);

        if params.suppress_progress {
            fp.set_print_progress(false);
            fp.set_print_realtime(false);
            fp.set_print_timestamps(false);
        }

        // ── Per-call state + inference ────────────────────────────────────
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| InferenceError::StateInit(e.to_string()))?;

        let wall_start = std::time::Instant::now();

        state
            .full(fp, audio)
            .map_err(|e| InferenceError::Inference(e.to_string()))?;

        // ── Collect segments ──────────────────────────────────────────────
        let n_segments = state
            .full_n_segments()
            .map_err(|e| InferenceError::Inference(e.to_string()))?;

        let mut text = String::new();
        let mut segments: Vec<Segment> = Vec::new();

        for i in 0..n_segments {
            let seg_text = state
                .full_get_segment_text(i)
                .map_err(|e| InferenceError::Inference(format!("segment {i}: {e}")))?;

            text.push_str(&seg_text);

            if params.timestamps {
                // Timestamps come back in centiseconds.
                let t0 = state.full_get_segment_t0(i).unwrap_or(0).max(0) as u64 * 10;
                let t1 = state.full_get_segment_t1(i).unwrap_or(0).max(0) as u64 * 10;
                segments.push(Segment {
                    text: seg_text,
                    start_ms: t0,
                    end_ms: t1,
                });
            }
        }

        Ok(TranscriptionResult {
            text: text.trim().to_string(),
            segments,
            duration_ms: wall_start.elapsed().as_millis(),
        })
    }
}

// ---------------------------------------------------------------------------
// MockAsrEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without loading any
/// model file.
#[cfg(test)]
pub struct MockAsrEngine {
    response: Result<String, InferenceError>,
}

#[cfg(test)]
impl MockAsrEngine {
    /// Create a mock that always returns `Ok` with the given text.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
        }
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: InferenceError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
impl AsrEngine for MockAsrEngine {
    fn transcribe(
        &self,
        audio: &[f32],
        params: &TranscribeParams,
    ) -> Result<TranscriptionResult, InferenceError> {
        // Enforce the empty-audio contract even in the mock so callers are
        // tested against it.
        if audio.is_empty() {
            return Err(InferenceError::EmptyAudio);
        }
        self.response.clone().map(|text| TranscriptionResult {
            segments: if params.timestamps {
                vec![Segment {
                    text: text.clone(),
                    start_ms: 0,
                    end_ms: (audio.len() as u64 * 1_000) / 16_000,
                }]
            } else {
                Vec::new()
            },
            text,
            duration_ms: 0,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- MockAsrEngine ---

    #[test]
    fn mock_ok_returns_configured_text() {
        let engine = MockAsrEngine::ok("olá mundo");
        let audio = vec![0.0_f32; 16_000];
        let result = engine.transcribe(&audio, &TranscribeParams::default()).unwrap();
        assert_eq!(result.text, "olá mundo");
        assert!(result.segments.is_empty());
    }

    #[test]
    fn mock_err_returns_configured_error() {
        let engine = MockAsrEngine::err(InferenceError::Inference("boom".into()));
        let audio = vec![0.0_f32; 16_000];
        let err = engine
            .transcribe(&audio, &TranscribeParams::default())
            .unwrap_err();
        assert!(matches!(err, InferenceError::Inference(_)));
    }

    #[test]
    fn empty_audio_is_rejected() {
        let engine = MockAsrEngine::ok("text");
        let err = engine
            .transcribe(&[], &TranscribeParams::default())
            .unwrap_err();
        assert!(matches!(err, InferenceError::EmptyAudio));
    }

    #[test]
    fn timestamps_flag_populates_segments() {
        let engine = MockAsrEngine::ok("com tempo");
        let audio = vec![0.0_f32; 32_000]; // 2 s at 16 kHz
        let params = TranscribeParams {
            timestamps: true,
            ..TranscribeParams::default()
        };
        let result = engine.transcribe(&audio, &params).unwrap();
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].end_ms, 2_000);
    }

    // --- WhisperEngine::load missing path ---

    #[test]
    fn load_missing_model_returns_not_found() {
        let result = WhisperEngine::load("/nonexistent/model.bin");
        assert!(
            matches!(result, Err(ModelLoadError::NotFound(_))),
            "expected NotFound, got: {result:?}"
        );
    }

    // --- Object safety ---

    #[test]
    fn box_dyn_asr_engine_compiles() {
        // If this test compiles, the trait is object-safe.
        let engine: Box<dyn AsrEngine> = Box::new(MockAsrEngine::ok("ok"));
        let _ = engine.transcribe(&[0.0; 160], &TranscribeParams::default());
    }

    // --- InferenceError display ---

    #[test]
    fn inference_error_display_empty_audio() {
        assert!(InferenceError::EmptyAudio.to_string().contains("empty"));
    }
}
