//! Audio-to-Text — file transcription with optional noise suppression.
//!
//! Takes an uploaded audio file (`.m4a`, `.mp3`, `.wav`), optionally cleans
//! it up, and produces a transcript from a locally-run Whisper model.
//!
//! # Pipeline
//!
//! ```text
//! upload bytes
//!   └─▶ audio::normalize_to_wav          (Format Normalizer)
//!         └─▶ denoise::NoiseSuppressor   (optional, user-toggled)
//!               └─▶ stt::AsrEngine       (16 kHz mono feed, whisper.cpp)
//!                     └─▶ pipeline::SessionState (transcript + buffer)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audio_to_text::audio::AudioFormat;
//! use audio_to_text::pipeline::{RunOptions, Session};
//!
//! # fn example() -> anyhow::Result<()> {
//! let upload = std::fs::read("recording.mp3")?;
//!
//! let mut session = Session::with_default_cache();
//! let result = session.run(&upload, AudioFormat::Mp3, &RunOptions::default())?;
//! println!("{}", result.text);
//! # Ok(()) }
//! ```
//!
//! Model weights are downloaded on first use and cached per model
//! identifier under the platform's data directory; later runs reuse the
//! cache without network access.

pub mod audio;
pub mod denoise;
pub mod export;
pub mod pipeline;
pub mod stt;
