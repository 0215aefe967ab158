//! Persistence port for clients.

use async_trait::async_trait;

use entipedia_core::{AppResult, ClientId, Page, PageRequest};

use crate::client::{Client, ClientPatch};

/// Client storage. Every method reports failures as `AppError` values; lookup
/// misses are `NOT_FOUND`.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn find_by_id(&self, id: ClientId) -> AppResult<Client>;

    /// One page of clients ordered by creation time.
    async fn find_page(&self, request: PageRequest) -> AppResult<Page<Client>>;

    async fn create(&self, client: Client) -> AppResult<Client>;

    async fn update(&self, id: ClientId, patch: ClientPatch) -> AppResult<Client>;

    async fn delete(&self, id: ClientId) -> AppResult<()>;
}
