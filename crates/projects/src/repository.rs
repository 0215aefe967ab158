use async_trait::async_trait;

use entipedia_core::{AppResult, ProjectId};

use crate::project::{Project, ProjectPatch};
use crate::value_objects::ProjectStatus;

/// Project storage port.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_by_id(&self, id: ProjectId) -> AppResult<Project>;

    /// All projects ordered by creation time.
    async fn find_all(&self) -> AppResult<Vec<Project>>;

    /// One kanban column.
    async fn find_by_status(&self, status: ProjectStatus) -> AppResult<Vec<Project>>;

    async fn create(&self, project: Project) -> AppResult<Project>;

    async fn update(&self, id: ProjectId, patch: ProjectPatch) -> AppResult<Project>;

    async fn delete(&self, id: ProjectId) -> AppResult<()>;
}
