use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use entipedia_core::{AppResult, Entity, ProjectId};
use entipedia_projects::{
    Project, ProjectName, ProjectPatch, ProjectPriority, ProjectProps, ProjectRepository,
    ProjectStatus,
};

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: ProjectName,
    pub description: String,
    /// Defaults to `PENDING`.
    pub status: Option<ProjectStatus>,
    /// Defaults to `MEDIUM`.
    pub priority: Option<ProjectPriority>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub name: ProjectName,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: *project.id(),
            name: project.name().clone(),
            description: project.description().to_string(),
            status: project.status(),
            priority: project.priority(),
            created_at: project.created_at(),
        }
    }
}

#[derive(Clone)]
pub struct ProjectService {
    repository: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    pub fn new(repository: Arc<dyn ProjectRepository>) -> Self {
        Self { repository }
    }

    /// All projects, or a single kanban column when `status` is given.
    pub async fn list(&self, status: Option<ProjectStatus>) -> AppResult<Vec<ProjectResponse>> {
        let projects = match status {
            Some(status) => self.repository.find_by_status(status).await?,
            None => self.repository.find_all().await?,
        };
        Ok(projects.into_iter().map(ProjectResponse::from).collect())
    }

    pub async fn get(&self, id: ProjectId) -> AppResult<ProjectResponse> {
        self.repository.find_by_id(id).await.map(ProjectResponse::from)
    }

    pub async fn create(&self, input: NewProject) -> AppResult<ProjectResponse> {
        let project = Project::from_props(ProjectProps {
            id: ProjectId::new(),
            name: input.name,
            description: input.description.trim().to_string(),
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            created_at: Utc::now(),
        });

        let created = self.repository.create(project).await?;
        info!(project_id = %created.id(), status = created.status().as_str(), "project created");
        Ok(created.into())
    }

    pub async fn update(&self, id: ProjectId, patch: ProjectPatch) -> AppResult<ProjectResponse> {
        self.repository.update(id, patch).await.map(ProjectResponse::from)
    }

    pub async fn delete(&self, id: ProjectId) -> AppResult<()> {
        self.repository.delete(id).await
    }
}
