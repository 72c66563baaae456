// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! On-disk persistence for uploaded screenshots
//!
//! Uploads land under `<media root>/ui_uploads/` with a second-resolution
//! timestamp appended to the original stem. Stored files are never cleaned
//! up - retention is explicitly out of scope for this node. Two uploads of
//! the same original name within the same second collide; accepted
//! limitation.

use chrono::Local;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Subdirectory of the media root holding uploads
pub const UPLOAD_SUBDIR: &str = "ui_uploads";

/// Chunk size for streaming an upload to disk
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Errors raised while persisting an upload
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create upload directory: {0}")]
    CreateDir(#[source] std::io::Error),

    #[error("failed to write upload to disk: {0}")]
    Write(#[source] std::io::Error),
}

/// A persisted upload
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Generated filename (stem + timestamp + extension)
    pub file_name: String,
    /// Absolute or media-root-relative path of the stored file
    pub path: PathBuf,
}

/// Writes uploads into the media root with collision-resistant names
#[derive(Debug, Clone)]
pub struct UploadStore {
    upload_dir: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `<media_root>/ui_uploads`
    pub fn new<P: AsRef<Path>>(media_root: P) -> Self {
        Self {
            upload_dir: media_root.as_ref().join(UPLOAD_SUBDIR),
        }
    }

    /// Directory uploads are written into
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Persist `data` under a timestamped name derived from `original_name`
    ///
    /// The upload directory is created if absent (idempotent). The file is
    /// written in chunks. Directory components in `original_name` are
    /// discarded - only the final stem and extension survive.
    pub fn store(&self, original_name: &str, data: &[u8]) -> Result<StoredUpload, StorageError> {
        let file_name = timestamped_name(original_name);

        fs::create_dir_all(&self.upload_dir).map_err(StorageError::CreateDir)?;

        let path = self.upload_dir.join(&file_name);
        let mut file = File::create(&path).map_err(StorageError::Write)?;
        for chunk in data.chunks(UPLOAD_CHUNK_SIZE) {
            file.write_all(chunk).map_err(StorageError::Write)?;
        }

        debug!("Stored upload at {}", path.display());

        Ok(StoredUpload { file_name, path })
    }
}

/// Build `<stem>_<YYYYMMDD_HHMMSS><ext>` from an original filename
fn timestamped_name(original_name: &str) -> String {
    let original = Path::new(original_name);
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    match original.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, timestamp, ext),
        None => format!("{}_{}", stem, timestamp),
    }
}
