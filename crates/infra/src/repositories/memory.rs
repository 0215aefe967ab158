//! In-memory repositories for development and tests.
//!
//! Each repository wraps an [`InMemoryTable`] and routes every operation through
//! the [`Executor`], exactly like the Postgres implementations.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use entipedia_clients::{Client, ClientPatch, ClientRepository};
use entipedia_core::{AppError, AppResult, ClientId, Entity, FileId, Page, PageRequest, ProjectId};
use entipedia_files::{FileRecord, FileRepository};
use entipedia_projects::{Project, ProjectPatch, ProjectRepository, ProjectStatus};

use crate::executor::Executor;

/// Keyed rows behind a `RwLock`.
#[derive(Debug)]
pub struct InMemoryTable<K, V> {
    name: &'static str,
    rows: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryTable<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, HashMap<K, V>>> {
        self.rows
            .read()
            .map_err(|_| anyhow::anyhow!("{} table lock poisoned", self.name))
    }

    fn write(&self) -> anyhow::Result<RwLockWriteGuard<'_, HashMap<K, V>>> {
        self.rows
            .write()
            .map_err(|_| anyhow::anyhow!("{} table lock poisoned", self.name))
    }

    pub fn get(&self, key: &K) -> anyhow::Result<Option<V>> {
        Ok(self.read()?.get(key).cloned())
    }

    pub fn values(&self) -> anyhow::Result<Vec<V>> {
        Ok(self.read()?.values().cloned().collect())
    }

    /// Insert a new row; an existing key is a conflict.
    pub fn insert(&self, key: K, value: V) -> anyhow::Result<()> {
        let mut rows = self.write()?;
        if rows.contains_key(&key) {
            return Err(AppError::conflict(format!("{} already exists", self.name)).into());
        }
        rows.insert(key, value);
        Ok(())
    }

    /// Mutate a row in place and return the new value.
    pub fn modify(&self, key: &K, f: impl FnOnce(&mut V)) -> anyhow::Result<Option<V>> {
        let mut rows = self.write()?;
        Ok(rows.get_mut(key).map(|row| {
            f(row);
            row.clone()
        }))
    }

    pub fn remove(&self, key: &K) -> anyhow::Result<Option<V>> {
        Ok(self.write()?.remove(key))
    }
}

#[derive(Debug)]
pub struct InMemoryClientRepository {
    table: InMemoryTable<ClientId, Client>,
    executor: Executor,
}

impl InMemoryClientRepository {
    pub fn new(executor: Executor) -> Self {
        Self {
            table: InMemoryTable::new("Client"),
            executor,
        }
    }
}

fn client_not_found(id: ClientId) -> anyhow::Error {
    AppError::not_found("Client", Some(&id.to_string())).into()
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn find_by_id(&self, id: ClientId) -> AppResult<Client> {
        self.executor
            .execute("clients.find_by_id", || async move {
                self.table.get(&id)?.ok_or_else(|| client_not_found(id))
            })
            .await
    }

    async fn find_page(&self, request: PageRequest) -> AppResult<Page<Client>> {
        self.executor
            .execute("clients.find_page", || async move {
                let mut all = self.table.values()?;
                all.sort_by_key(|c| (c.created_at(), *c.id()));

                let total = all.len() as u64;
                let items = all
                    .into_iter()
                    .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
                    .take(usize::try_from(request.page_size()).unwrap_or(usize::MAX))
                    .collect();
                Ok(Page::new(items, total, request))
            })
            .await
    }

    async fn create(&self, client: Client) -> AppResult<Client> {
        self.executor
            .execute("clients.create", || async move {
                self.table.insert(*client.id(), client.clone())?;
                Ok(client)
            })
            .await
    }

    async fn update(&self, id: ClientId, patch: ClientPatch) -> AppResult<Client> {
        self.executor
            .execute("clients.update", || async move {
                self.table
                    .modify(&id, |client| client.apply(&patch))?
                    .ok_or_else(|| client_not_found(id))
            })
            .await
    }

    async fn delete(&self, id: ClientId) -> AppResult<()> {
        self.executor
            .execute("clients.delete", || async move {
                self.table
                    .remove(&id)?
                    .map(|_| ())
                    .ok_or_else(|| client_not_found(id))
            })
            .await
    }
}

#[derive(Debug)]
pub struct InMemoryProjectRepository {
    table: InMemoryTable<ProjectId, Project>,
    executor: Executor,
}

impl InMemoryProjectRepository {
    pub fn new(executor: Executor) -> Self {
        Self {
            table: InMemoryTable::new("Project"),
            executor,
        }
    }

    fn sorted(&self, status: Option<ProjectStatus>) -> anyhow::Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .table
            .values()?
            .into_iter()
            .filter(|p| status.is_none_or(|s| p.status() == s))
            .collect();
        projects.sort_by_key(|p| (p.created_at(), *p.id()));
        Ok(projects)
    }
}

fn project_not_found(id: ProjectId) -> anyhow::Error {
    AppError::not_found("Project", Some(&id.to_string())).into()
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn find_by_id(&self, id: ProjectId) -> AppResult<Project> {
        self.executor
            .execute("projects.find_by_id", || async move {
                self.table.get(&id)?.ok_or_else(|| project_not_found(id))
            })
            .await
    }

    async fn find_all(&self) -> AppResult<Vec<Project>> {
        self.executor
            .execute("projects.find_all", || async move { self.sorted(None) })
            .await
    }

    async fn find_by_status(&self, status: ProjectStatus) -> AppResult<Vec<Project>> {
        self.executor
            .execute("projects.find_by_status", || async move {
                self.sorted(Some(status))
            })
            .await
    }

    async fn create(&self, project: Project) -> AppResult<Project> {
        self.executor
            .execute("projects.create", || async move {
                self.table.insert(*project.id(), project.clone())?;
                Ok(project)
            })
            .await
    }

    async fn update(&self, id: ProjectId, patch: ProjectPatch) -> AppResult<Project> {
        self.executor
            .execute("projects.update", || async move {
                self.table
                    .modify(&id, |project| project.apply(&patch))?
                    .ok_or_else(|| project_not_found(id))
            })
            .await
    }

    async fn delete(&self, id: ProjectId) -> AppResult<()> {
        self.executor
            .execute("projects.delete", || async move {
                self.table
                    .remove(&id)?
                    .map(|_| ())
                    .ok_or_else(|| project_not_found(id))
            })
            .await
    }
}

#[derive(Debug)]
pub struct InMemoryFileRepository {
    table: InMemoryTable<FileId, FileRecord>,
    executor: Executor,
}

impl InMemoryFileRepository {
    pub fn new(executor: Executor) -> Self {
        Self {
            table: InMemoryTable::new("File"),
            executor,
        }
    }
}

fn file_not_found(id: FileId) -> anyhow::Error {
    AppError::not_found("File", Some(&id.to_string())).into()
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn find_by_id(&self, id: FileId) -> AppResult<FileRecord> {
        self.executor
            .execute("files.find_by_id", || async move {
                self.table.get(&id)?.ok_or_else(|| file_not_found(id))
            })
            .await
    }

    async fn find_all(&self) -> AppResult<Vec<FileRecord>> {
        self.executor
            .execute("files.find_all", || async move {
                let mut files = self.table.values()?;
                files.sort_by_key(|f| std::cmp::Reverse((f.uploaded_at(), *f.id())));
                Ok(files)
            })
            .await
    }

    async fn create(&self, record: FileRecord) -> AppResult<FileRecord> {
        self.executor
            .execute("files.create", || async move {
                self.table.insert(*record.id(), record.clone())?;
                Ok(record)
            })
            .await
    }

    async fn delete(&self, id: FileId) -> AppResult<()> {
        self.executor
            .execute("files.delete", || async move {
                self.table
                    .remove(&id)?
                    .map(|_| ())
                    .ok_or_else(|| file_not_found(id))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use entipedia_clients::{ClientKind, ClientProps};
    use entipedia_core::{ErrorKind, MoneyDop};
    use entipedia_files::{FileKind, FileRecordProps};
    use entipedia_projects::{ProjectName, ProjectPriority, ProjectProps};

    fn client(name: &str, minutes_ago: i64) -> Client {
        Client::from_props(ClientProps {
            id: ClientId::new(),
            name: name.to_string(),
            kind: ClientKind::Person,
            email: None,
            phone: None,
            lifetime_value: None,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        })
    }

    fn project(name: &str, status: ProjectStatus) -> Project {
        Project::from_props(ProjectProps {
            id: ProjectId::new(),
            name: ProjectName::new(name).unwrap(),
            description: "desc".to_string(),
            status,
            priority: ProjectPriority::default(),
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn client_pages_follow_creation_order() {
        let repo = InMemoryClientRepository::new(Executor::default());
        for i in 0..25 {
            repo.create(client(&format!("c{i}"), 100 - i)).await.unwrap();
        }

        let page = repo.find_page(PageRequest::new(Some(3), Some(10))).await.unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].name(), "c20");

        let beyond = repo.find_page(PageRequest::new(Some(9), Some(10))).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 25);
    }

    #[tokio::test]
    async fn missing_client_is_not_found() {
        let repo = InMemoryClientRepository::new(Executor::default());
        let id = ClientId::new();

        let err = repo.find_by_id(id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), format!("Client with id {id} not found"));

        assert_eq!(repo.delete(id).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(
            repo.update(id, ClientPatch::default()).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn update_applies_patch_and_persists() {
        let repo = InMemoryClientRepository::new(Executor::default());
        let created = repo.create(client("Ana", 0)).await.unwrap();

        let patch = ClientPatch {
            lifetime_value: Some(MoneyDop::from_amount(99.99).unwrap()),
            ..ClientPatch::default()
        };
        let updated = repo.update(*created.id(), patch).await.unwrap();
        assert_eq!(updated.lifetime_value().unwrap().cents(), 9999);

        let reloaded = repo.find_by_id(*created.id()).await.unwrap();
        assert_eq!(reloaded, updated);
    }

    #[tokio::test]
    async fn duplicate_ids_conflict() {
        let repo = InMemoryClientRepository::new(Executor::default());
        let c = client("Ana", 0);
        repo.create(c.clone()).await.unwrap();

        let err = repo.create(c).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.http_status(), 409);
    }

    #[tokio::test]
    async fn projects_filter_by_status() {
        let repo = InMemoryProjectRepository::new(Executor::default());
        repo.create(project("a", ProjectStatus::Pending)).await.unwrap();
        repo.create(project("b", ProjectStatus::Done)).await.unwrap();
        repo.create(project("c", ProjectStatus::Done)).await.unwrap();

        assert_eq!(repo.find_all().await.unwrap().len(), 3);
        let done = repo.find_by_status(ProjectStatus::Done).await.unwrap();
        assert_eq!(done.len(), 2);
        assert!(done.iter().all(|p| p.status() == ProjectStatus::Done));
        assert!(repo.find_by_status(ProjectStatus::InReview).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn files_list_newest_first() {
        let repo = InMemoryFileRepository::new(Executor::default());
        for (name, minutes_ago) in [("old.txt", 10), ("new.txt", 1)] {
            repo.create(FileRecord::from_props(FileRecordProps {
                id: FileId::new(),
                name: name.to_string(),
                kind: FileKind::detect(name),
                size_in_bytes: 3,
                mime_type: "text/plain".to_string(),
                path: format!("0-{name}"),
                description: None,
                uploaded_at: Utc::now() - Duration::minutes(minutes_ago),
            }))
            .await
            .unwrap();
        }

        let files = repo.find_all().await.unwrap();
        assert_eq!(files[0].name(), "new.txt");
        assert_eq!(files[1].name(), "old.txt");
    }
}
