use std::path::{Path, PathBuf};

use super::{decode_owned, InputError};

/// Reads a complete log file into memory
pub struct FileSource {
    file_path: PathBuf,
}

impl FileSource {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        FileSource {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Check if the file exists
    pub fn is_valid(&self) -> bool {
        self.file_path.is_file()
    }

    /// Read and decode the whole file
    pub fn read_text(&self) -> Result<String, InputError> {
        let bytes = std::fs::read(&self.file_path)?;
        log::debug!("Read {} byte(s) from {:?}", bytes.len(), self.file_path);
        decode_owned(bytes)
    }
}

// ============================================
// Async File Source
// ============================================

/// Async version of FileSource for use with tokio
pub struct AsyncFileSource {
    file_path: PathBuf,
}

impl AsyncFileSource {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        AsyncFileSource {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read and decode the whole file without blocking the runtime
    pub async fn read_text(&self) -> Result<String, InputError> {
        let bytes = tokio::fs::read(&self.file_path).await?;
        log::debug!("Read {} byte(s) from {:?}", bytes.len(), self.file_path);
        decode_owned(bytes)
    }
}
