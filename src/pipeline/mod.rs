//! Pipeline — session state and the synchronous run orchestration.
//!
//! One user action maps to one [`Session::run`] call: Format Normalizer →
//! optional Noise Suppressor → Transcriber, blocking until complete.  There
//! is no background work and at most one in-flight run per session.

pub mod runner;
pub mod state;

pub use runner::{EngineProvider, PipelineError, RunOptions, Session, WhisperProvider};
pub use state::SessionState;
