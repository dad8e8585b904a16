//! Audio layer — format normalisation, canonical WAV codec, resampling.
//!
//! # Pipeline position
//!
//! ```text
//! upload bytes ─▶ decode::normalize_to_wav ─▶ canonical WAV
//!                                              │
//!                       (optional denoise)  ◀──┘
//!                                              │
//!            wav::decode ─▶ downmix_to_mono ─▶ resample_to_16k ─▶ stt
//! ```
//!
//! The canonical interchange format between stages is 16-bit PCM WAV held
//! in memory; [`WaveformBuffer`] is its decoded form.

pub mod buffer;
pub mod decode;
pub mod resample;
pub mod wav;

pub use buffer::WaveformBuffer;
pub use decode::{normalize_to_wav, AudioFormat, DecodeError};
pub use resample::{downmix_to_mono, resample_to_16k, MODEL_SAMPLE_RATE};
