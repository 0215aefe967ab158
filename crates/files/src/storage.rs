//! Byte storage port.

use async_trait::async_trait;

use entipedia_core::AppError;

/// Where an upload landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Path relative to the storage root; this is what metadata records keep.
    pub path: String,
    pub size_in_bytes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("stored file not found: {0}")]
    NotFound(String),

    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::not_found("File", None),
            other => AppError::internal(Some(&other.to_string())),
        }
    }
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persist `bytes` under a name derived from `original_name`.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError>;

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove stored bytes. A missing file is not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}
