use async_trait::async_trait;

use entipedia_core::{AppResult, FileId};

use crate::record::FileRecord;

/// File metadata storage port.
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn find_by_id(&self, id: FileId) -> AppResult<FileRecord>;

    /// All records, newest upload first.
    async fn find_all(&self) -> AppResult<Vec<FileRecord>>;

    async fn create(&self, record: FileRecord) -> AppResult<FileRecord>;

    async fn delete(&self, id: FileId) -> AppResult<()>;
}
