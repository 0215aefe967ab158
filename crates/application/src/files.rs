use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use entipedia_core::{AppResult, Entity, FileId};
use entipedia_files::{FileKind, FileRecord, FileRecordProps, FileRepository, FileStorage};

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A validated upload.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub original_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: FileId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub size: u64,
    pub mime_type: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// File bytes ready to be sent back.
#[derive(Debug, Clone)]
pub struct Download {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct FileService {
    repository: Arc<dyn FileRepository>,
    storage: Arc<dyn FileStorage>,
    public_base_url: String,
}

impl FileService {
    pub fn new(
        repository: Arc<dyn FileRepository>,
        storage: Arc<dyn FileStorage>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            storage,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn respond(&self, record: FileRecord) -> FileResponse {
        let id = *record.id();
        let props = record.props();
        FileResponse {
            id,
            name: props.name.clone(),
            kind: props.kind,
            size: props.size_in_bytes,
            mime_type: props.mime_type.clone(),
            url: format!("{}/api/v1/files/{}/download", self.public_base_url, id),
            description: props.description.clone(),
            uploaded_at: props.uploaded_at,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<FileResponse>> {
        let records = self.repository.find_all().await?;
        Ok(records.into_iter().map(|r| self.respond(r)).collect())
    }

    pub async fn get(&self, id: FileId) -> AppResult<FileResponse> {
        let record = self.repository.find_by_id(id).await?;
        Ok(self.respond(record))
    }

    /// Store the bytes, then the metadata. When the metadata cannot be saved
    /// the stored bytes are removed again and the metadata error is returned.
    pub async fn upload(&self, upload: NewUpload) -> AppResult<FileResponse> {
        let stored = self
            .storage
            .save(&upload.original_name, &upload.bytes)
            .await?;

        let name = upload.original_name.trim().to_string();
        let record = FileRecord::from_props(FileRecordProps {
            id: FileId::new(),
            kind: FileKind::detect(&name),
            name,
            size_in_bytes: stored.size_in_bytes,
            mime_type: upload
                .mime_type
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            path: stored.path.clone(),
            description: upload.description.map(|d| d.trim().to_string()),
            uploaded_at: Utc::now(),
        });

        match self.repository.create(record).await {
            Ok(created) => {
                info!(file_id = %created.id(), path = %stored.path, "file uploaded");
                Ok(self.respond(created))
            }
            Err(err) => {
                if let Err(cleanup) = self.storage.delete(&stored.path).await {
                    warn!(path = %stored.path, error = %cleanup, "failed to remove orphaned upload");
                }
                Err(err)
            }
        }
    }

    pub async fn download(&self, id: FileId) -> AppResult<Download> {
        let record = self.repository.find_by_id(id).await?;
        let bytes = self.storage.read(record.path()).await?;
        Ok(Download {
            name: record.name().to_string(),
            mime_type: record.mime_type().to_string(),
            bytes,
        })
    }

    /// Remove the metadata, then the bytes. Byte removal is best-effort.
    pub async fn delete(&self, id: FileId) -> AppResult<()> {
        let record = self.repository.find_by_id(id).await?;
        self.repository.delete(id).await?;

        if let Err(err) = self.storage.delete(record.path()).await {
            warn!(file_id = %id, path = record.path(), error = %err, "failed to remove stored file");
        }
        info!(file_id = %id, "file deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use entipedia_core::{AppError, ErrorKind};
    use entipedia_infra::repositories::InMemoryFileRepository;
    use entipedia_infra::{Executor, LocalFileStorage};

    struct FailingRepository;

    #[async_trait]
    impl FileRepository for FailingRepository {
        async fn find_by_id(&self, id: FileId) -> AppResult<FileRecord> {
            Err(AppError::not_found("File", Some(&id.to_string())))
        }

        async fn find_all(&self) -> AppResult<Vec<FileRecord>> {
            Ok(Vec::new())
        }

        async fn create(&self, _record: FileRecord) -> AppResult<FileRecord> {
            Err(AppError::internal(Some("Database operation failed")))
        }

        async fn delete(&self, _id: FileId) -> AppResult<()> {
            Ok(())
        }
    }

    fn upload(name: &str) -> NewUpload {
        NewUpload {
            original_name: name.to_string(),
            mime_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4".to_vec(),
            description: Some(" Contrato firmado ".to_string()),
        }
    }

    fn service(dir: &tempfile::TempDir) -> FileService {
        FileService::new(
            Arc::new(InMemoryFileRepository::new(Executor::default())),
            Arc::new(LocalFileStorage::new(dir.path())),
            "http://localhost:3000/",
        )
    }

    #[tokio::test]
    async fn upload_download_delete() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir);

        let file = service.upload(upload("Contrato.pdf")).await.unwrap();
        assert_eq!(file.kind, FileKind::Document);
        assert_eq!(file.size, 8);
        assert_eq!(file.description.as_deref(), Some("Contrato firmado"));
        assert_eq!(
            file.url,
            format!("http://localhost:3000/api/v1/files/{}/download", file.id)
        );

        let download = service.download(file.id).await.unwrap();
        assert_eq!(download.bytes, b"%PDF-1.4");
        assert_eq!(download.mime_type, "application/pdf");
        assert_eq!(download.name, "Contrato.pdf");

        service.delete(file.id).await.unwrap();
        assert_eq!(
            service.get(file.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_mime_type_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = upload("blob");
        input.mime_type = None;

        let file = service(&dir).upload(input).await.unwrap();
        assert_eq!(file.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(file.kind, FileKind::Other);
    }

    #[tokio::test]
    async fn failed_metadata_write_removes_the_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let service = FileService::new(
            Arc::new(FailingRepository),
            Arc::new(LocalFileStorage::new(dir.path())),
            "http://localhost:3000",
        );

        let err = service.upload(upload("a.pdf")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
