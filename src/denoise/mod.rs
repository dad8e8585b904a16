//! Noise Suppressor — optional preprocessing between decode and transcribe.
//!
//! # Pipeline
//!
//! ```text
//! canonical WAV ─▶ normalize_peak ─▶ reduce_noise ─▶ high_pass(200 Hz)
//!               ─▶ low_pass(5 kHz) ─▶ canonical WAV
//! ```
//!
//! The suppressor is a pure, deterministic function of its input and the
//! fixed parameters held by [`NoiseSuppressor`]: no learned state, no
//! randomness, no separate noise clip.  Output duration and channel count
//! always equal the input's, and all-silence input degrades gracefully to
//! silence.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audio_to_text::denoise::NoiseSuppressor;
//!
//! # fn example(wav_bytes: &[u8]) -> Result<(), audio_to_text::audio::DecodeError> {
//! let suppressor = NoiseSuppressor::default();
//! let cleaned = suppressor.process(wav_bytes)?;
//! # Ok(()) }
//! ```

pub mod filter;
pub mod normalize;
pub mod spectral;

pub use filter::{high_pass, low_pass};
pub use normalize::normalize_peak;
pub use spectral::reduce_noise;

use crate::audio::decode::DecodeError;
use crate::audio::wav;

// ---------------------------------------------------------------------------
// NoiseSuppressor
// ---------------------------------------------------------------------------

/// Fixed-parameter noise suppression over canonical WAV bytes.
///
/// The defaults mirror a speech-cleanup recipe: strong spectral gating at
/// 0.85, then band-limiting to the 200 Hz – 5 kHz speech band.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseSuppressor {
    /// Spectral gate strength; gated bins keep `1 − prop_decrease` of their
    /// magnitude.
    pub prop_decrease: f32,
    /// High-pass cutoff in Hz (removes rumble below the voice band).
    pub high_pass_hz: f32,
    /// Low-pass cutoff in Hz (rolls off hiss above the consonant range).
    pub low_pass_hz: f32,
}

impl Default for NoiseSuppressor {
    fn default() -> Self {
        Self {
            prop_decrease: 0.85,
            high_pass_hz: 200.0,
            low_pass_hz: 5_000.0,
        }
    }
}

impl NoiseSuppressor {
    /// Apply the three transformations in fixed order and re-encode.
    ///
    /// Normalization sees the whole interleaved buffer (one global gain, so
    /// channel balance is kept); gating and filtering run per channel.
    ///
    /// # Errors
    ///
    /// [`DecodeError`] when `wav_bytes` is not a valid canonical WAV stream.
    pub fn process(&self, wav_bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut buffer = wav::decode(wav_bytes)?;

        normalize::normalize_peak(buffer.samples_mut());

        let sample_rate = buffer.sample_rate();
        for ch in 0..buffer.channels() {
            let mut lane = buffer.channel(ch);
            lane = spectral::reduce_noise(&lane, self.prop_decrease);
            filter::high_pass(&mut lane, self.high_pass_hz, sample_rate);
            filter::low_pass(&mut lane, self.low_pass_hz, sample_rate);
            buffer.set_channel(ch, &lane);
        }

        wav::encode(&buffer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
