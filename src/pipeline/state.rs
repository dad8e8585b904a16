//! Session-scoped result cache.
//!
//! [`SessionState`] is the in-memory equivalent of the UI's session store:
//! the last transcript and the last processed audio buffer.  Both fields
//! are overwritten together on every successful run and cleared together by
//! [`SessionState::clear`]; a failed run leaves them untouched.  Whether a
//! model is currently loaded is tracked by the owning
//! [`Session`](crate::pipeline::Session), which resets it in the same
//! action.

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Transient per-session results, with no consistency requirements beyond
/// "overwritten on each new run, cleared on reset".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Transcript text of the most recent successful run.
    pub transcript: Option<String>,

    /// Canonical WAV bytes that were fed to the transcriber on the most
    /// recent successful run (post-suppression when denoising was on).
    pub processed_audio: Option<Vec<u8>>,
}

impl SessionState {
    /// A fresh, empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally drop both cached results.
    pub fn clear(&mut self) {
        self.transcript = None;
        self.processed_audio = None;
    }

    /// Returns `true` when a transcript from a previous run is available.
    pub fn has_transcript(&self) -> bool {
        self.transcript.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
