//! Local disk file storage.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use entipedia_files::{FileStorage, StorageError, StoredFile};

/// Attempts at finding a free `{timestamp}-{name}` slot before giving up.
const MAX_NAME_ATTEMPTS: i64 = 16;

/// Stores uploads as flat files under one root directory.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if needed.
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let flat = !path.is_empty()
            && path != "."
            && path != ".."
            && !path.contains(['/', '\\'])
            && !path.contains('\0');
        if !flat {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(path))
    }
}

/// Replace every char outside `[A-Za-z0-9_.-]` with `-` and lowercase the rest.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    if sanitized.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

/// Write all of `bytes` to a freshly created file. On failure the file is
/// removed so no truncated upload is left behind.
async fn write_new_file<W>(mut file: W, full: &Path, bytes: &[u8]) -> Result<(), StorageError>
where
    W: AsyncWrite + Unpin,
{
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(err) => Err(err),
    };
    drop(file);

    if let Err(err) = written {
        if let Err(cleanup) = fs::remove_file(full).await {
            warn!(path = %full.display(), error = %cleanup, "failed to remove partial upload");
        }
        return Err(err.into());
    }
    Ok(())
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        self.ensure_root().await?;
        let name = sanitize_file_name(original_name);
        let started = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let relative = format!("{}-{}", started + attempt, name);
            let full = self.resolve(&relative)?;

            let file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&full)
                .await
            {
                Ok(file) => file,
                Err(err) if err.kind() == IoErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            };

            write_new_file(file, &full, bytes).await?;
            debug!(path = %relative, size = bytes.len(), "stored upload");

            return Ok(StoredFile {
                path: relative,
                size_in_bytes: bytes.len() as u64,
            });
        }

        Err(StorageError::Io(std::io::Error::new(
            IoErrorKind::AlreadyExists,
            format!("no free storage name for {name}"),
        )))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full = self.resolve(path)?;
        match fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                warn!(path, "stored file already gone");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
