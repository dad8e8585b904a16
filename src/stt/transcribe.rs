//! Transcription parameter and result types.
//!
//! [`TranscribeParams`] carries the settings for a single inference run;
//! [`TranscriptionResult`] is what every [`crate::stt::AsrEngine`] returns.

// ---------------------------------------------------------------------------
// SamplingStrategy
// ---------------------------------------------------------------------------

/// Mirrors `whisper_rs::SamplingStrategy` but is owned and `Clone`.
///
/// Greedy single-pass decoding is the default; beam search trades latency
/// for a small accuracy gain.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingStrategy {
    /// Greedy (single-pass) decoding.
    Greedy {
        /// Number of candidate tokens evaluated per step.  1 is fastest.
        best_of: i32,
    },
    /// Beam-search decoding.
    BeamSearch {
        /// Number of beams maintained in parallel.
        beam_size: i32,
        /// Beam-search patience factor (≥1.0 = standard beam search).
        patience: f32,
    },
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        Self::Greedy { best_of: 1 }
    }
}

// ---------------------------------------------------------------------------
// TranscribeParams
// ---------------------------------------------------------------------------

/// All parameters for a single transcription run.
///
/// ```
/// use audio_to_text::stt::TranscribeParams;
///
/// let params = TranscribeParams {
///     language: "pt".into(),
///     timestamps: true,
///     ..TranscribeParams::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 language code (e.g. `"pt"`, `"en"`), or `"auto"` to let the
    /// model detect the language.
    pub language: String,

    /// Decoding strategy.
    pub strategy: SamplingStrategy,

    /// Number of CPU threads handed to the inference backend.
    pub n_threads: i32,

    /// Collect per-segment timing information into the result.
    ///
    /// Off by default; the transcript text is identical either way.
    pub timestamps: bool,

    /// Suppress the backend's progress output to stderr.
    pub suppress_progress: bool,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            strategy: SamplingStrategy::default(),
            n_threads: optimal_threads(),
            timestamps: false,
            suppress_progress: true,
        }
    }
}

/// Number of CPU threads to use for inference, capped at 8 — Whisper shows
/// diminishing returns beyond that.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// The output of a successful transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    /// Full concatenated transcript text, trimmed of surrounding whitespace.
    pub text: String,

    /// Time-aligned segments; empty unless
    /// [`TranscribeParams::timestamps`] was set.
    pub segments: Vec<Segment>,

    /// Wall-clock time the inference took, in milliseconds.
    pub duration_ms: u128,
}

/// A single time-aligned text chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Segment text (may include punctuation inserted by the model).
    pub text: String,
    /// Start time in milliseconds from the beginning of the audio.
    pub start_ms: u64,
    /// End time in milliseconds from the beginning of the audio.
    pub end_ms: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_request_no_timestamps() {
        let p = TranscribeParams::default();
        assert!(!p.timestamps);
        assert_eq!(p.language, "auto");
        assert_eq!(p.strategy, SamplingStrategy::Greedy { best_of: 1 });
    }

    #[test]
    fn optimal_threads_is_positive_and_at_most_8() {
        let t = optimal_threads();
        assert!((1..=8).contains(&t));
    }
}
