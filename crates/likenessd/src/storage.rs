//! Transient upload storage.
//!
//! Uploads live exactly as long as one request needs them: [`UploadStore`]
//! writes the payload to a uniquely named file and hands back a guard whose
//! drop deletes it on every exit path.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("failed to store upload: {0}")]
pub struct StorageError(#[from] std::io::Error);

/// Writes upload payloads to uniquely named transient files.
pub struct UploadStore {
    dir: Option<PathBuf>,
}

/// A stored upload. The backing file is removed when this guard drops.
pub struct TempUpload {
    file: NamedTempFile,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl UploadStore {
    /// `dir` overrides the OS temp dir as the storage location.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Persist an upload payload to a new transient file with a `.jpg`
    /// suffix, fully written and flushed before the path is handed out.
    ///
    /// Failure here is a normal per-request outcome; callers surface it in
    /// the response rather than propagating further.
    pub fn store(&self, payload: &[u8]) -> Result<TempUpload, StorageError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("likeness-upload-").suffix(".jpg");

        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(payload)?;
        file.flush()?;

        tracing::debug!(path = %file.path().display(), bytes = payload.len(), "stored upload");

        Ok(TempUpload { file })
    }
}
