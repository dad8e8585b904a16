//! Session runner — drives the full decode → denoise → transcribe pipeline.
//!
//! One [`Session`] corresponds to one user session: it owns the
//! [`SessionState`] result cache and at most one loaded ASR engine.  Each
//! [`run`](Session::run) is a single blocking call that executes the stages
//! strictly in sequence:
//!
//! ```text
//! input bytes ─▶ normalize_to_wav ─▶ [NoiseSuppressor] ─▶ downmix + 16 kHz
//!             ─▶ AsrEngine::transcribe ─▶ commit transcript + buffer
//! ```
//!
//! The engine is cached inside the session keyed by model identifier, so
//! re-running with an unchanged model reuses the loaded weights without a
//! reload or re-download.  Errors are surfaced directly and never retried;
//! a failed run leaves the previous results in place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::audio::decode::{normalize_to_wav, AudioFormat, DecodeError};
use crate::audio::resample::{downmix_to_mono, resample_to_16k};
use crate::audio::wav;
use crate::denoise::NoiseSuppressor;
use crate::stt::{
    ensure_model, find_model_by_id, AsrEngine, InferenceError, ModelInfo, ModelLoadError,
    ModelPaths, ProgressFn, TranscribeParams, TranscriptionResult, WhisperEngine,
    DEFAULT_MODEL_ID,
};

use super::state::SessionState;

// ---------------------------------------------------------------------------
// RunOptions
// ---------------------------------------------------------------------------

/// The entire user-facing configuration surface for one transcription run.
///
/// There are no config files and no environment variables; everything is an
/// explicit field.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Identifier of the model to run (see [`crate::stt::MODELS`]).
    pub model_id: String,
    /// Apply the noise suppressor before transcription.  Off by default —
    /// the untouched upload usually transcribes fine.
    pub denoise: bool,
    /// Collect per-segment timestamps into the result.
    pub timestamps: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.into(),
            denoise: false,
            timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Everything that can make a run fail.  Surfaced directly to the user;
/// never retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The requested model identifier is not in the registry.
    #[error("unknown model identifier: {0}")]
    UnknownModel(String),

    /// The upload could not be decoded (or an internal WAV was malformed).
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Weights could not be fetched, were corrupt, or failed to load.
    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    /// The model rejected the audio or the inference pass failed.
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

// ---------------------------------------------------------------------------
// EngineProvider
// ---------------------------------------------------------------------------

/// Seam between the session and engine construction.
///
/// The production implementation is [`WhisperProvider`]; tests substitute a
/// counting mock to verify the session's caching behaviour.
pub trait EngineProvider: Send + Sync {
    /// Produce a ready-to-use engine for `model`.
    fn load(&self, model: &'static ModelInfo) -> Result<Arc<dyn AsrEngine>, ModelLoadError>;
}

/// Production provider: resolve weights through the on-disk cache, then
/// load them into a [`WhisperEngine`].
pub struct WhisperProvider {
    paths: ModelPaths,
}

impl WhisperProvider {
    /// Provider over the platform's per-user cache directory.
    pub fn new() -> Self {
        Self {
            paths: ModelPaths::user_default(),
        }
    }

    /// Provider over an explicit cache directory.
    pub fn with_paths(paths: ModelPaths) -> Self {
        Self { paths }
    }

    /// Progress callback that logs roughly every 10% of the download.
    fn logging_progress() -> ProgressFn {
        let last_decile = AtomicU64::new(0);
        Box::new(move |done, total| {
            if total == 0 {
                return;
            }
            let decile = done * 10 / total;
            if decile > last_decile.swap(decile, Ordering::Relaxed) {
                log::info!("model download: {}%", decile * 10);
            }
        })
    }
}

impl Default for WhisperProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineProvider for WhisperProvider {
    fn load(&self, model: &'static ModelInfo) -> Result<Arc<dyn AsrEngine>, ModelLoadError> {
        let weights = ensure_model(model, &self.paths, Some(Self::logging_progress()))?;
        let engine = WhisperEngine::load(&weights)?;
        Ok(Arc::new(engine))
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single user session: result cache plus at most one loaded engine.
///
/// ```rust,no_run
/// use audio_to_text::audio::AudioFormat;
/// use audio_to_text::pipeline::{RunOptions, Session};
///
/// # fn example(upload: &[u8]) -> Result<(), audio_to_text::pipeline::PipelineError> {
/// let mut session = Session::with_default_cache();
/// let result = session.run(upload, AudioFormat::Mp3, &RunOptions::default())?;
/// println!("{}", result.text);
///
/// session.reset(); // drops transcript, buffer and the loaded model
/// # Ok(()) }
/// ```
pub struct Session {
    provider: Arc<dyn EngineProvider>,
    /// Loaded engine keyed by model identifier; `Some` is the
    /// "model currently loaded" flag.
    engine: Option<(String, Arc<dyn AsrEngine>)>,
    state: SessionState,
}

impl Session {
    /// Create a session over a custom engine provider.
    pub fn new(provider: Arc<dyn EngineProvider>) -> Self {
        Self {
            provider,
            engine: None,
            state: SessionState::new(),
        }
    }

    /// Create a session backed by the platform's per-user weights cache.
    pub fn with_default_cache() -> Self {
        Self::new(Arc::new(WhisperProvider::new()))
    }

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------

    /// Execute one transcription run, strictly in sequence, blocking until
    /// complete.
    ///
    /// On success the session's transcript and processed-audio cache are
    /// overwritten; on any error they keep their previous values.
    pub fn run(
        &mut self,
        input: &[u8],
        format: AudioFormat,
        options: &RunOptions,
    ) -> Result<TranscriptionResult, PipelineError> {
        let model = find_model_by_id(&options.model_id)
            .ok_or_else(|| PipelineError::UnknownModel(options.model_id.clone()))?;

        log::info!(
            "run: format={format} model={} denoise={} timestamps={}",
            model.id,
            options.denoise,
            options.timestamps
        );

        // ── 1. Format normalisation ──────────────────────────────────────
        let wav_bytes = normalize_to_wav(input, format)?;

        // ── 2. Optional noise suppression ────────────────────────────────
        let processed = if options.denoise {
            NoiseSuppressor::default().process(&wav_bytes)?
        } else {
            wav_bytes
        };

        // ── 3. Engine, cached per model identifier ───────────────────────
        let engine = self.engine_for(model)?;

        // ── 4. Model feed: mono, 16 kHz ──────────────────────────────────
        let buffer = wav::decode(&processed)?;
        let mono = downmix_to_mono(buffer.samples(), buffer.channels());
        let audio = resample_to_16k(&mono, buffer.sample_rate());

        let params = TranscribeParams {
            language: model_language(model),
            timestamps: options.timestamps,
            ..TranscribeParams::default()
        };

        let result = engine.transcribe(&audio, &params)?;
        log::info!(
            "transcribed {:.1} s of audio in {} ms",
            buffer.duration_secs(),
            result.duration_ms
        );

        // Commit only now — a failed run must leave prior state untouched.
        self.state.transcript = Some(result.text.clone());
        self.state.processed_audio = Some(processed);

        Ok(result)
    }

    // -----------------------------------------------------------------------
    // State accessors & reset
    // -----------------------------------------------------------------------

    /// Transcript of the most recent successful run.
    pub fn transcript(&self) -> Option<&str> {
        self.state.transcript.as_deref()
    }

    /// Canonical WAV bytes fed to the transcriber on the most recent
    /// successful run.
    pub fn processed_audio(&self) -> Option<&[u8]> {
        self.state.processed_audio.as_deref()
    }

    /// Whether a model is currently loaded in this session.
    pub fn model_loaded(&self) -> bool {
        self.engine.is_some()
    }

    /// Drop the transcript, the processed-audio cache and the loaded model,
    /// unconditionally.  The on-disk weights cache is untouched.
    pub fn reset(&mut self) {
        log::debug!("session reset");
        self.state.clear();
        self.engine = None;
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn engine_for(
        &mut self,
        model: &'static ModelInfo,
    ) -> Result<Arc<dyn AsrEngine>, ModelLoadError> {
        if let Some((id, engine)) = &self.engine {
            if id == model.id {
                log::debug!("engine cache hit for model '{}'", model.id);
                return Ok(Arc::clone(engine));
            }
        }

        let engine = self.provider.load(model)?;
        self.engine = Some((model.id.to_string(), Arc::clone(&engine)));
        Ok(engine)
    }
}

/// Language hint derived from the model's tuning: fine-tuned models pin
/// their language, multilingual ones auto-detect.
fn model_language(model: &ModelInfo) -> String {
    if model.language == "multilingual" {
        "auto".into()
    } else {
        model.language.into()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::WaveformBuffer;
    use crate::stt::MockAsrEngine;
    use std::sync::atomic::AtomicUsize;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Provider that counts how often weights are loaded — the stand-in for
    /// "was a download triggered".
    struct CountingProvider {
        loads: Arc<AtomicUsize>,
    }

    impl EngineProvider for CountingProvider {
        fn load(
            &self,
            _model: &'static ModelInfo,
        ) -> Result<Arc<dyn AsrEngine>, ModelLoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockAsrEngine::ok("olá mundo")))
        }
    }

    /// Provider whose engines always fail inference.
    struct FailingEngineProvider;

    impl EngineProvider for FailingEngineProvider {
        fn load(
            &self,
            _model: &'static ModelInfo,
        ) -> Result<Arc<dyn AsrEngine>, ModelLoadError> {
            Ok(Arc::new(MockAsrEngine::err(InferenceError::Inference(
                "backend exploded".into(),
            ))))
        }
    }

    /// Provider that cannot load weights at all.
    struct UnavailableProvider;

    impl EngineProvider for UnavailableProvider {
        fn load(
            &self,
            model: &'static ModelInfo,
        ) -> Result<Arc<dyn AsrEngine>, ModelLoadError> {
            Err(ModelLoadError::NotFound(model.file_name.into()))
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// One second of a 440 Hz tone as canonical WAV bytes.
    fn wav_upload() -> Vec<u8> {
        let samples: Vec<f32> = (0..16_000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 16_000.0).sin() * 0.4)
            .collect();
        let buf = WaveformBuffer::new(samples, 16_000, 1).unwrap();
        wav::encode(&buf).unwrap()
    }

    fn counting_session() -> (Session, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let session = Session::new(Arc::new(CountingProvider {
            loads: Arc::clone(&loads),
        }));
        (session, loads)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    fn successful_run_commits_transcript_and_buffer() {
        let (mut session, _) = counting_session();
        let result = session
            .run(&wav_upload(), AudioFormat::Wav, &RunOptions::default())
            .unwrap();

        assert_eq!(result.text, "olá mundo");
        assert_eq!(session.transcript(), Some("olá mundo"));
        assert!(session.processed_audio().is_some());
        assert!(session.model_loaded());
    }

    #[test]
    fn rerun_with_same_model_does_not_reload_weights() {
        let (mut session, loads) = counting_session();
        let opts = RunOptions::default();

        session.run(&wav_upload(), AudioFormat::Wav, &opts).unwrap();
        session.run(&wav_upload(), AudioFormat::Wav, &opts).unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1, "second run must hit the cache");
    }

    #[test]
    fn switching_models_loads_again() {
        let (mut session, loads) = counting_session();

        session
            .run(&wav_upload(), AudioFormat::Wav, &RunOptions::default())
            .unwrap();
        session
            .run(
                &wav_upload(),
                AudioFormat::Wav,
                &RunOptions {
                    model_id: "whisper-small".into(),
                    ..RunOptions::default()
                },
            )
            .unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_clears_everything_and_forces_reload() {
        let (mut session, loads) = counting_session();
        let opts = RunOptions::default();

        session.run(&wav_upload(), AudioFormat::Wav, &opts).unwrap();
        session.reset();

        assert!(session.transcript().is_none());
        assert!(session.processed_audio().is_none());
        assert!(!session.model_loaded());

        session.run(&wav_upload(), AudioFormat::Wav, &opts).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_on_fresh_session_is_a_noop() {
        let (mut session, _) = counting_session();
        session.reset();
        assert!(!session.model_loaded());
    }

    #[test]
    fn denoised_run_still_produces_transcript() {
        let (mut session, _) = counting_session();
        let opts = RunOptions {
            denoise: true,
            ..RunOptions::default()
        };

        let result = session.run(&wav_upload(), AudioFormat::Wav, &opts).unwrap();
        assert_eq!(result.text, "olá mundo");

        // The committed buffer is the denoised one — still a decodable WAV
        // of the same duration.
        let committed = wav::decode(session.processed_audio().unwrap()).unwrap();
        assert_eq!(committed.frames(), 16_000);
    }

    #[test]
    fn unknown_model_is_rejected_before_any_work() {
        let (mut session, loads) = counting_session();
        let err = session
            .run(
                &wav_upload(),
                AudioFormat::Wav,
                &RunOptions {
                    model_id: "no-such-model".into(),
                    ..RunOptions::default()
                },
            )
            .unwrap_err();

        assert!(matches!(err, PipelineError::UnknownModel(_)));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn decode_failure_leaves_prior_state_untouched() {
        let (mut session, _) = counting_session();
        let opts = RunOptions::default();

        session.run(&wav_upload(), AudioFormat::Wav, &opts).unwrap();
        let before = session.transcript().unwrap().to_string();

        let err = session
            .run(b"not audio at all", AudioFormat::Mp3, &opts)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
        assert_eq!(session.transcript(), Some(before.as_str()));
    }

    #[test]
    fn inference_failure_leaves_prior_state_untouched() {
        let mut session = Session::new(Arc::new(FailingEngineProvider));
        let err = session
            .run(&wav_upload(), AudioFormat::Wav, &RunOptions::default())
            .unwrap_err();

        assert!(matches!(err, PipelineError::Inference(_)));
        assert!(session.transcript().is_none());
        assert!(session.processed_audio().is_none());
    }

    #[test]
    fn unavailable_weights_surface_as_model_load_error() {
        let mut session = Session::new(Arc::new(UnavailableProvider));
        let err = session
            .run(&wav_upload(), AudioFormat::Wav, &RunOptions::default())
            .unwrap_err();

        assert!(matches!(err, PipelineError::ModelLoad(_)));
        assert!(!session.model_loaded());
    }

    #[test]
    fn timestamps_option_reaches_the_engine() {
        let (mut session, _) = counting_session();
        let opts = RunOptions {
            timestamps: true,
            ..RunOptions::default()
        };

        let result = session.run(&wav_upload(), AudioFormat::Wav, &opts).unwrap();
        assert!(!result.segments.is_empty());
    }

    #[test]
    fn model_language_pins_fine_tunes() {
        let pt = find_model_by_id("whisper-small-pt").unwrap();
        assert_eq!(model_language(pt), "pt");

        let multi = find_model_by_id("whisper-small").unwrap();
        assert_eq!(model_language(multi), "auto");
    }
}
