//! Transcriber — model registry, weights cache, and the ASR engine.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 AsrEngine (trait)                       │
//! │                                                        │
//! │  ┌────────────┐   ensure_model    ┌───────────────┐   │
//! │  │ ModelPaths  │──────────────────▶│ WhisperEngine │   │
//! │  │ MODELS      │  (cache / fetch)  │  - ctx        │   │
//! │  └────────────┘                   └───────┬───────┘   │
//! │                                            ▼           │
//! │                                  transcribe(audio,     │
//! │                                  params) → text        │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audio_to_text::stt::{
//!     ensure_model, find_model_by_id, AsrEngine, ModelPaths, TranscribeParams,
//!     WhisperEngine, DEFAULT_MODEL_ID,
//! };
//!
//! let model = find_model_by_id(DEFAULT_MODEL_ID).unwrap();
//! let paths = ModelPaths::user_default();
//! let weights = ensure_model(model, &paths, None).expect("weights unavailable");
//! let engine = WhisperEngine::load(&weights).expect("corrupt weights");
//!
//! // audio: 16 kHz, mono, f32 PCM from the audio module
//! let audio: Vec<f32> = vec![0.0; 16_000]; // 1 s of silence
//! let result = engine.transcribe(&audio, &TranscribeParams::default()).unwrap();
//! println!("{}", result.text);
//! ```

pub mod download;
pub mod engine;
pub mod model;
pub mod transcribe;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use download::{ensure_model, ModelLoadError, ProgressFn};
pub use engine::{AsrEngine, InferenceError, WhisperEngine};
pub use model::{find_model_by_id, ModelInfo, ModelPaths, DEFAULT_MODEL_ID, MODELS};
pub use transcribe::{SamplingStrategy, Segment, TranscribeParams, TranscriptionResult};

// test-only re-export so the pipeline test module can import MockAsrEngine
// without reaching into `stt::engine`.
#[cfg(test)]
pub use engine::MockAsrEngine;
