//! Model weights fetching and on-disk caching.
//!
//! [`ensure_model`] resolves a model's weights, cache-first:
//!
//! 1. If the file already sits in the cache directory, return it — a cache
//!    hit never touches the network.
//! 2. Otherwise download from the registry URL into a `.part` file and
//!    atomically rename it into place.
//!
//! The rename gives the cache write-once-per-identifier semantics: readers
//! in other processes either see the complete file or nothing, never a
//! half-written one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::stt::model::{ModelInfo, ModelPaths};

// ---------------------------------------------------------------------------
// ModelLoadError
// ---------------------------------------------------------------------------

/// The model's weights could not be made available or could not be loaded.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// The weights file is not where the cache said it would be.
    #[error("model weights not found at {0}")]
    NotFound(String),

    /// The cache directory could not be created.
    #[error("failed to create model cache directory: {0}")]
    CacheDir(#[source] std::io::Error),

    /// The HTTP download failed.
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Writing the weights to disk failed.
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The downloaded body is empty or shorter than the server announced.
    #[error("downloaded weights for '{id}' are corrupt: {reason}")]
    Corrupt { id: String, reason: String },

    /// The weights file exists but the inference backend rejected it.
    #[error("whisper context initialisation failed: {0}")]
    ContextInit(String),
}

// ---------------------------------------------------------------------------
// ensure_model
// ---------------------------------------------------------------------------

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server did not provide a Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Return the on-disk path of `model`'s weights, downloading on first use.
///
/// Subsequent calls with the same model identifier hit the cache and return
/// immediately without any network traffic.
pub fn ensure_model(
    model: &ModelInfo,
    paths: &ModelPaths,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelLoadError> {
    let dest = paths.model_path(model);
    if dest.exists() {
        log::debug!("model '{}' served from cache: {}", model.id, dest.display());
        return Ok(dest);
    }

    fs::create_dir_all(&paths.models_dir).map_err(ModelLoadError::CacheDir)?;

    log::info!(
        "downloading model '{}' (~{} MB) from {}",
        model.id,
        model.file_size_mb,
        model.source_url
    );
    download(model, &dest, progress)?;
    Ok(dest)
}

fn download(
    model: &ModelInfo,
    dest: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelLoadError> {
    let response = reqwest::blocking::get(model.source_url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|source| ModelLoadError::Download {
            url: model.source_url.to_string(),
            source,
        })?;

    let total = response.content_length().unwrap_or(0);

    // Write to a temp file first, then rename into place for atomicity.
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(|e| ModelLoadError::Write {
        path: temp_path.clone(),
        source: e,
    })?;

    let bytes = response.bytes().map_err(|source| ModelLoadError::Download {
        url: model.source_url.to_string(),
        source,
    })?;

    // Truncation check; deeper validation is the inference backend's job.
    if bytes.is_empty() || (total > 0 && bytes.len() as u64 != total) {
        let _ = fs::remove_file(&temp_path);
        return Err(ModelLoadError::Corrupt {
            id: model.id.to_string(),
            reason: format!("received {} of {} bytes", bytes.len(), total),
        });
    }

    let mut written: u64 = 0;
    let chunk_size = 1024 * 1024;
    for chunk in bytes.chunks(chunk_size) {
        file.write_all(chunk).map_err(|e| ModelLoadError::Write {
            path: temp_path.clone(),
            source: e,
        })?;
        written += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(written, total);
        }
    }

    file.flush().map_err(|e| ModelLoadError::Write {
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelLoadError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
