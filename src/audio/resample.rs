//! Downmix and resampling for the transcription front-end.
//!
//! Whisper inference expects **16 kHz mono `f32`** audio, while the
//! canonical waveform keeps whatever rate and channel count the upload had.
//! The two conversion steps live here:
//!
//! 1. [`downmix_to_mono`] — average interleaved channels into one.
//! 2. [`resample_to_16k`] — linear-interpolation resample to 16 000 Hz.
//!
//! Linear interpolation is accurate enough for speech that has already been
//! band-limited to 5 kHz by the noise suppressor, and keeps this crate free
//! of a windowed-sinc dependency.

/// Sample rate required by the speech model.
pub const MODEL_SAMPLE_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// downmix_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging channels.
///
/// The output length is `samples.len() / channels`.
///
/// * `channels == 1` returns the input as an owned `Vec` (no averaging).
/// * `channels == 0` returns an empty vector.
///
/// # Example
///
/// ```rust
/// use audio_to_text::audio::downmix_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, -0.2]; // L R L R
/// let mono = downmix_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!(mono[0].abs() < 1e-6);
/// ```
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample_to_16k
// ---------------------------------------------------------------------------

/// Resample mono `samples` from `source_rate` Hz to 16 000 Hz using linear
/// interpolation.
///
/// * A `source_rate` of exactly 16 000 returns the input unchanged.
/// * Empty input returns an empty vector.
///
/// The output length is approximately `samples.len() * 16_000 / source_rate`.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == MODEL_SAMPLE_RATE {
        return samples.to_vec();
    }

    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = MODEL_SAMPLE_RATE as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac as f32) + samples[idx + 1] * frac as f32
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- downmix_to_mono ----------------------------------------------------

    #[test]
    fn mono_input_is_passed_through() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&input, 1), input);
    }

    #[test]
    fn stereo_averages_frames() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = downmix_to_mono(&input, 2);
        assert_eq!(out.len(), 2);
        assert!(out[0].abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_channels_yield_empty() {
        assert!(downmix_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample_to_16k ----------------------------------------------------

    #[test]
    fn already_16k_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        let out = resample_to_16k(&input, 16_000);
        assert_eq!(out, input);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(resample_to_16k(&[], 48_000).is_empty());
    }

    #[test]
    fn downsample_48k_halves_thrice() {
        // 480 samples @ 48 kHz = 10 ms → 160 samples @ 16 kHz
        let out = resample_to_16k(&vec![0.5_f32; 480], 48_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn downsample_44100_within_one_sample() {
        let out = resample_to_16k(&vec![0.0_f32; 44_100], 44_100);
        assert!(out.len().abs_diff(16_000) <= 1, "got {}", out.len());
    }

    #[test]
    fn upsample_8k_doubles() {
        let out = resample_to_16k(&vec![0.0_f32; 80], 8_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn dc_signal_keeps_amplitude() {
        let out = resample_to_16k(&vec![0.5_f32; 480], 48_000);
        for &s in &out {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }
}
