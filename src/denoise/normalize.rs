//! Peak loudness normalization.
//!
//! Scales the whole buffer so its loudest sample sits just under full scale
//! (0.1 dB of headroom).  Scaling is exact and applied uniformly across all
//! channels, so the relative balance of a stereo recording is preserved and
//! no sample can clip.

/// Headroom left below full scale, in dB.
pub const HEADROOM_DB: f32 = 0.1;

/// Scale `samples` in place so the peak amplitude equals the target level.
///
/// All-zero (or empty) input is returned unchanged — there is no peak to
/// normalise and dividing by it would poison the buffer with NaNs.
///
/// # Example
///
/// ```rust
/// use audio_to_text::denoise::normalize_peak;
///
/// let mut quiet = vec![0.1_f32, -0.05, 0.02];
/// normalize_peak(&mut quiet);
/// // peak is now at -0.1 dBFS ≈ 0.9886
/// assert!((quiet[0].abs() - 0.9886).abs() < 1e-3);
/// ```
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max);
    if peak <= 0.0 || !peak.is_finite() {
        return;
    }

    let target = 10.0_f32.powf(-HEADROOM_DB / 20.0);
    let gain = target / peak;
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_of(samples: &[f32]) -> f32 {
        samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }

    #[test]
    fn quiet_audio_is_boosted_to_target() {
        let mut samples = vec![0.01_f32, -0.005, 0.002];
        normalize_peak(&mut samples);
        let target = 10.0_f32.powf(-HEADROOM_DB / 20.0);
        assert!((peak_of(&samples) - target).abs() < 1e-5);
    }

    #[test]
    fn loud_audio_is_attenuated_to_target() {
        let mut samples = vec![0.999_f32, -0.999];
        normalize_peak(&mut samples);
        assert!(peak_of(&samples) < 1.0, "normalization must not clip");
    }

    #[test]
    fn silence_is_left_untouched() {
        let mut samples = vec![0.0_f32; 128];
        normalize_peak(&mut samples);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn empty_input_is_a_noop() {
        let mut samples: Vec<f32> = Vec::new();
        normalize_peak(&mut samples);
        assert!(samples.is_empty());
    }

    #[test]
    fn relative_balance_is_preserved() {
        let mut samples = vec![0.4_f32, 0.2];
        normalize_peak(&mut samples);
        assert!((samples[0] / samples[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn output_is_always_finite() {
        let mut samples = vec![1e-30_f32, -1e-30];
        normalize_peak(&mut samples);
        assert!(samples.iter().all(|s| s.is_finite()));
    }
}
