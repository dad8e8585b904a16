//! Format Normalizer — arbitrary container in, canonical WAV out.
//!
//! [`normalize_to_wav`] decodes a compressed (or already uncompressed) audio
//! byte stream with symphonia and re-encodes it as canonical 16-bit PCM WAV
//! at the **source** sample rate and channel count.  No resampling and no
//! channel remixing happen here; that is the transcriber's job.
//!
//! The source container is declared by the caller via [`AudioFormat`],
//! derived from the uploaded file's extension.  The declared format is used
//! as a probe hint; a byte stream that cannot be probed or decoded fails
//! with [`DecodeError`].

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::audio::buffer::WaveformBuffer;
use crate::audio::wav;

// ---------------------------------------------------------------------------
// AudioFormat
// ---------------------------------------------------------------------------

/// Source container hint, taken from the uploaded file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    /// MPEG-4 audio (`.m4a`, typically AAC).
    M4a,
    /// MPEG layer III (`.mp3`).
    Mp3,
    /// RIFF WAV (`.wav`).
    Wav,
}

impl AudioFormat {
    /// Map a filename extension (without the dot, any case) to a format.
    ///
    /// ```rust
    /// use audio_to_text::audio::AudioFormat;
    ///
    /// assert_eq!(AudioFormat::from_extension("MP3"), Some(AudioFormat::Mp3));
    /// assert_eq!(AudioFormat::from_extension("ogg"), None);
    /// ```
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "m4a" => Some(Self::M4a),
            "mp3" => Some(Self::Mp3),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }

    /// The canonical lowercase extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::M4a => "m4a",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// The byte stream could not be turned into canonical waveform audio.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The container could not be probed or read as the declared format.
    #[error("input is not a valid {format} stream: {source}")]
    InvalidStream {
        format: &'static str,
        #[source]
        source: SymphoniaError,
    },

    /// The container holds no track with a decodable audio codec.
    #[error("no decodable audio track in input")]
    NoAudioTrack,

    /// A decoder for the track's codec could not be instantiated.
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(SymphoniaError),

    /// The stream probed successfully but produced no audio frames.
    #[error("audio stream decoded to zero frames")]
    EmptyStream,

    /// A canonical WAV buffer handed between pipeline stages is malformed.
    #[error("malformed canonical wav stream: {0}")]
    Wav(#[from] hound::Error),
}

// ---------------------------------------------------------------------------
// normalize_to_wav
// ---------------------------------------------------------------------------

/// Decode `input` as the declared `format` and re-encode it as canonical
/// 16-bit PCM WAV bytes at the source sample rate and channel count.
///
/// # Errors
///
/// - [`DecodeError::InvalidStream`] — probing failed; the bytes are not a
///   recognisable container of the declared format.
/// - [`DecodeError::NoAudioTrack`] / [`DecodeError::UnsupportedCodec`] — the
///   container has nothing this build can decode.
/// - [`DecodeError::EmptyStream`] — a well-formed container with no audio.
pub fn normalize_to_wav(input: &[u8], format: AudioFormat) -> Result<Vec<u8>, DecodeError> {
    let buffer = decode_to_buffer(input, format)?;
    wav::encode(&buffer)
}

/// Decode `input` as the declared `format` into a [`WaveformBuffer`].
///
/// Exposed separately so tests and callers that need sample access can skip
/// the WAV re-encode.
pub fn decode_to_buffer(
    input: &[u8],
    format: AudioFormat,
) -> Result<WaveformBuffer, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(input.to_vec())), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(format.extension());

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|source| DecodeError::InvalidStream {
            format: format.extension(),
            source,
        })?;
    let mut reader = probed.format;

    // First track with a known codec; everything else is skipped.
    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(DecodeError::UnsupportedCodec)?;

    let mut samples: Vec<f32> = Vec::new();
    let mut stream_spec: Option<(u32, u16)> = None;
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    // next_packet() reports end-of-stream as an error, so the loop runs
    // until the reader stops yielding packets.
    while let Ok(packet) = reader.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buf.is_none() {
                    let spec = *decoded.spec();
                    stream_spec = Some((spec.rate, spec.channels.count() as u16));
                    sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            // A corrupt packet inside an otherwise valid stream is skipped,
            // matching symphonia's recoverable-error contract.
            Err(SymphoniaError::DecodeError(e)) => {
                log::debug!("skipping undecodable packet: {e}");
            }
            Err(_) => break,
        }
    }

    let (rate, channels) = stream_spec.ok_or(DecodeError::EmptyStream)?;
    if samples.is_empty() {
        return Err(DecodeError::EmptyStream);
    }

    WaveformBuffer::new(samples, rate, channels).ok_or(DecodeError::NoAudioTrack)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_fixture(frames: usize, rate: u32, channels: u16) -> Vec<u8> {
        let samples: Vec<f32> = (0..frames * channels as usize)
            .map(|i| (i as f32 * 0.001).sin() * 0.4)
            .collect();
        let buf = WaveformBuffer::new(samples, rate, channels).unwrap();
        wav::encode(&buf).unwrap()
    }

    // ---- AudioFormat --------------------------------------------------------

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(AudioFormat::from_extension("M4A"), Some(AudioFormat::M4a));
        assert_eq!(AudioFormat::from_extension("Mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_extension("wav"), Some(AudioFormat::Wav));
    }

    #[test]
    fn format_from_unknown_extension_is_none() {
        assert_eq!(AudioFormat::from_extension("flac"), None);
        assert_eq!(AudioFormat::from_extension(""), None);
    }

    #[test]
    fn format_displays_as_extension() {
        assert_eq!(AudioFormat::Mp3.to_string(), "mp3");
    }

    // ---- normalize_to_wav ---------------------------------------------------

    #[test]
    fn wav_input_normalizes_to_same_duration() {
        // 0.5 s mono at 22.05 kHz
        let input = wav_fixture(11_025, 22_050, 1);
        let output = normalize_to_wav(&input, AudioFormat::Wav).unwrap();

        let decoded = wav::decode(&output).unwrap();
        assert_eq!(decoded.sample_rate(), 22_050);
        assert_eq!(decoded.channels(), 1);
        // ±1 sample of tolerance on frame count
        assert!(decoded.frames().abs_diff(11_025) <= 1);
    }

    #[test]
    fn stereo_wav_keeps_channel_count() {
        let input = wav_fixture(4_000, 44_100, 2);
        let output = normalize_to_wav(&input, AudioFormat::Wav).unwrap();

        let decoded = wav::decode(&output).unwrap();
        assert_eq!(decoded.channels(), 2);
        assert!(decoded.frames().abs_diff(4_000) <= 1);
    }

    #[test]
    fn garbage_bytes_fail_with_invalid_stream() {
        let err = normalize_to_wav(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01], AudioFormat::Mp3)
            .unwrap_err();
        assert!(
            matches!(err, DecodeError::InvalidStream { .. } | DecodeError::EmptyStream),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn empty_input_fails() {
        assert!(normalize_to_wav(&[], AudioFormat::Wav).is_err());
    }

    #[test]
    fn decode_to_buffer_preserves_samples() {
        let buf = WaveformBuffer::new(vec![0.25; 1_000], 16_000, 1).unwrap();
        let bytes = wav::encode(&buf).unwrap();

        let decoded = decode_to_buffer(&bytes, AudioFormat::Wav).unwrap();
        assert_eq!(decoded.frames(), 1_000);
        for &s in decoded.samples() {
            assert!((s - 0.25).abs() < 1e-3, "sample drift: {s}");
        }
    }
}
