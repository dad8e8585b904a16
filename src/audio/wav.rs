//! Canonical WAV encoding and decoding, entirely in memory.
//!
//! The pipeline's interchange format is uncompressed 16-bit PCM WAV at the
//! source's sample rate and channel count.  [`encode`] and [`decode`]
//! round-trip a [`WaveformBuffer`] through that representation without
//! touching the filesystem.
//!
//! Decoding is deliberately lenient about bit depth and sample format so
//! that externally produced WAV files (8/24/32-bit int, 32-bit float) are
//! accepted; encoding always emits the canonical 16-bit form.

use std::io::Cursor;

use crate::audio::buffer::WaveformBuffer;
use crate::audio::decode::DecodeError;

// ---------------------------------------------------------------------------
// encode
// ---------------------------------------------------------------------------

/// Encode a [`WaveformBuffer`] as canonical 16-bit PCM WAV bytes.
///
/// Samples are clamped to `[-1.0, 1.0]` before quantisation, so out-of-range
/// input cannot wrap around.
pub fn encode(buffer: &WaveformBuffer) -> Result<Vec<u8>, DecodeError> {
    let spec = hound::WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: WaveformBuffer::CANONICAL_BITS,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in buffer.samples() {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * i16::MAX as f32).round() as i16)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

/// Decode canonical WAV bytes back into a [`WaveformBuffer`].
///
/// Integer samples of any supported bit depth are rescaled to `[-1.0, 1.0]`;
/// float WAVs are passed through unchanged.
pub fn decode(bytes: &[u8]) -> Result<WaveformBuffer, DecodeError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, hound::Error>>()?,
        hound::SampleFormat::Int => {
            // Full-scale value for the stored bit depth, e.g. 32768 for 16-bit.
            let full_scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<Vec<_>, hound::Error>>()?
        }
    };

    WaveformBuffer::new(samples, spec.sample_rate, spec.channels)
        .ok_or(DecodeError::NoAudioTrack)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
