//! In-memory waveform container passed between pipeline stages.
//!
//! [`WaveformBuffer`] holds interleaved `f32` samples plus the sample rate,
//! channel count and bit depth of the source material.  It is purely
//! transient — stages decode it from canonical WAV bytes, transform it, and
//! re-encode it.  The one structural invariant is that the sample vector
//! length is a whole number of frames (a multiple of the channel count).
//!
//! # Example
//!
//! ```rust
//! use audio_to_text::audio::WaveformBuffer;
//!
//! // 10 ms of stereo silence at 44.1 kHz
//! let buf = WaveformBuffer::new(vec![0.0; 882], 44_100, 2).unwrap();
//! assert_eq!(buf.frames(), 441);
//! assert!((buf.duration_secs() - 0.01).abs() < 1e-6);
//! ```

// ---------------------------------------------------------------------------
// WaveformBuffer
// ---------------------------------------------------------------------------

/// Raw audio samples with their format metadata.
///
/// Samples are interleaved (`L R L R …` for stereo) and normalised to the
/// `[-1.0, 1.0]` range.  The canonical on-the-wire form is 16-bit PCM WAV
/// (see [`crate::audio::wav`]), so `bits_per_sample` is fixed at 16 for
/// buffers produced by this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
}

impl WaveformBuffer {
    /// Bit depth of the canonical interchange format.
    pub const CANONICAL_BITS: u16 = 16;

    /// Create a buffer from interleaved samples.
    ///
    /// Returns `None` when the invariant does not hold: `channels` is zero,
    /// `sample_rate` is zero, or `samples.len()` is not a multiple of
    /// `channels`.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Option<Self> {
        if channels == 0 || sample_rate == 0 || samples.len() % channels as usize != 0 {
            return None;
        }
        Some(Self {
            samples,
            sample_rate,
            channels,
            bits_per_sample: Self::CANONICAL_BITS,
        })
    }

    /// Interleaved samples, one `f32` per channel per frame.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mutable access to the interleaved samples.
    ///
    /// The length must not be changed through this reference; stages that
    /// transform audio in place (normalization, filtering) rely on it.
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Consume the buffer and return the sample vector.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Bit depth of the canonical encoding of this buffer.
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration of the buffer in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Returns `true` when the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Extract a single channel as a contiguous vector.
    ///
    /// # Panics
    ///
    /// Panics when `channel >= self.channels()`.
    pub fn channel(&self, channel: u16) -> Vec<f32> {
        assert!(channel < self.channels, "channel index out of range");
        let step = self.channels as usize;
        self.samples
            .iter()
            .skip(channel as usize)
            .step_by(step)
            .copied()
            .collect()
    }

    /// Write `data` back into the given channel lane.
    ///
    /// # Panics
    ///
    /// Panics when `channel >= self.channels()` or `data.len()` differs from
    /// [`frames`](Self::frames).
    pub fn set_channel(&mut self, channel: u16, data: &[f32]) {
        assert!(channel < self.channels, "channel index out of range");
        assert_eq!(data.len(), self.frames(), "channel length mismatch");
        let step = self.channels as usize;
        for (frame, &value) in data.iter().enumerate() {
            self.samples[frame * step + channel as usize] = value;
        }
    }

    /// Peak absolute amplitude across all channels (`0.0` for an empty
    /// buffer).
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
