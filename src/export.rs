//! Transcript export.
//!
//! The transcript can be offered for download as a UTF-8 plain-text file.
//! File name and MIME type are fixed: `transcricao.txt`, `text/plain`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name offered for transcript downloads.
pub const EXPORT_FILE_NAME: &str = "transcricao.txt";

/// MIME type of the exported file.
pub const EXPORT_MIME: &str = "text/plain";

// ---------------------------------------------------------------------------
// TranscriptExport
// ---------------------------------------------------------------------------

/// A transcript packaged for download.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptExport {
    /// Suggested file name (`transcricao.txt`).
    pub file_name: &'static str,
    /// MIME type (`text/plain`).
    pub mime: &'static str,
    /// UTF-8 encoded transcript text.
    pub content: Vec<u8>,
}

/// Package `transcript` for download.
pub fn export_transcript(transcript: &str) -> TranscriptExport {
    TranscriptExport {
        file_name: EXPORT_FILE_NAME,
        mime: EXPORT_MIME,
        content: transcript.as_bytes().to_vec(),
    }
}

impl TranscriptExport {
    /// Write the export into `dir` under its fixed file name and return the
    /// full path.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = dir.as_ref().join(self.file_name);
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
