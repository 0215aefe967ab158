//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! | SQLx error | Code | Result |
//! |------------|------|--------|
//! | Database (unique violation) | `23505` | `CONFLICT` |
//! | anything else | | `INTERNAL_SERVER_ERROR` via the executor |
//!
//! Driver details stay in the error chain, which the executor only logs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use entipedia_clients::{Client, ClientKind, ClientPatch, ClientProps, ClientRepository};
use entipedia_core::{
    AppError, AppResult, ClientId, Entity, FileId, MoneyDop, Page, PageRequest, ProjectId,
};
use entipedia_files::{FileKind, FileRecord, FileRecordProps, FileRepository};
use entipedia_projects::{
    Project, ProjectName, ProjectPatch, ProjectProps, ProjectRepository, ProjectStatus,
};

use crate::executor::Executor;

/// Map SQLx errors into the error an executor operation returns.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> anyhow::Error {
    if is_unique_violation(&err) {
        return AppError::conflict("A record with the same unique value already exists").into();
    }
    anyhow::Error::new(err).context(format!("database error in {operation}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

/// A stored value the domain rejects. Never a client error, so it is built
/// as a plain error and ends up as `INTERNAL_SERVER_ERROR`.
fn corrupt(table: &str, column: &str, value: &str) -> anyhow::Error {
    anyhow::anyhow!("corrupt {table}.{column} value {value:?}")
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

const CLIENT_COLUMNS: &str = "id, name, type, email, phone, lifetime_value_cents, created_at";

#[derive(Debug)]
struct ClientRow {
    id: uuid::Uuid,
    name: String,
    kind: String,
    email: Option<String>,
    phone: Option<String>,
    lifetime_value_cents: Option<i64>,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ClientRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ClientRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            kind: row.try_get("type")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            lifetime_value_cents: row.try_get("lifetime_value_cents")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl ClientRow {
    fn into_client(self) -> anyhow::Result<Client> {
        let kind: ClientKind = self
            .kind
            .parse()
            .map_err(|_| corrupt("clients", "type", &self.kind))?;
        let lifetime_value = self
            .lifetime_value_cents
            .map(MoneyDop::from_cents)
            .transpose()
            .map_err(|_| {
                let raw = format!("{:?}", self.lifetime_value_cents);
                corrupt("clients", "lifetime_value_cents", &raw)
            })?;

        Ok(Client::from_props(ClientProps {
            id: ClientId::from_uuid(self.id),
            name: self.name,
            kind,
            email: self.email,
            phone: self.phone,
            lifetime_value,
            created_at: self.created_at,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct PostgresClientRepository {
    pool: PgPool,
    executor: Executor,
}

impl PostgresClientRepository {
    pub fn new(pool: PgPool, executor: Executor) -> Self {
        Self { pool, executor }
    }

    async fn fetch(&self, id: ClientId) -> anyhow::Result<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("clients.find_by_id", e))?;

        match row {
            Some(row) => row.into_client(),
            None => Err(AppError::not_found("Client", Some(&id.to_string())).into()),
        }
    }

    async fn write_back(&self, client: &Client) -> anyhow::Result<Client> {
        let id = *client.id();
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            UPDATE clients
            SET name = $2, type = $3, email = $4, phone = $5, lifetime_value_cents = $6
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(client.name())
        .bind(client.kind().as_str())
        .bind(client.email())
        .bind(client.phone())
        .bind(client.lifetime_value().map(|m| m.cents()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("clients.update", e))?;

        match row {
            Some(row) => row.into_client(),
            None => Err(AppError::not_found("Client", Some(&id.to_string())).into()),
        }
    }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    #[instrument(skip(self), fields(client_id = %id))]
    async fn find_by_id(&self, id: ClientId) -> AppResult<Client> {
        self.executor
            .execute("clients.find_by_id", || self.fetch(id))
            .await
    }

    #[instrument(skip(self), fields(page = request.page(), page_size = request.page_size()))]
    async fn find_page(&self, request: PageRequest) -> AppResult<Page<Client>> {
        self.executor
            .execute("clients.find_page", || async move {
                let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM clients")
                    .fetch_one(&self.pool)
                    .await
                    .and_then(|row| row.try_get("total"))
                    .map_err(|e| map_sqlx_error("clients.count", e))?;

                let rows = sqlx::query_as::<_, ClientRow>(&format!(
                    r#"
                    SELECT {CLIENT_COLUMNS}
                    FROM clients
                    ORDER BY created_at ASC, id ASC
                    LIMIT $1 OFFSET $2
                    "#
                ))
                .bind(to_i64(request.page_size()))
                .bind(to_i64(request.offset()))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("clients.find_page", e))?;

                let items = rows
                    .into_iter()
                    .map(ClientRow::into_client)
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(Page::new(items, total.max(0) as u64, request))
            })
            .await
    }

    #[instrument(skip(self, client), fields(client_id = %client.id()))]
    async fn create(&self, client: Client) -> AppResult<Client> {
        self.executor
            .execute("clients.create", || async move {
                // Plain insert: an existing id must surface as a conflict.
                sqlx::query(&format!(
                    "INSERT INTO clients ({CLIENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
                ))
                .bind(client.id().as_uuid())
                .bind(client.name())
                .bind(client.kind().as_str())
                .bind(client.email())
                .bind(client.phone())
                .bind(client.lifetime_value().map(|m| m.cents()))
                .bind(client.created_at())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("clients.create", e))?;
                Ok(client)
            })
            .await
    }

    #[instrument(skip(self, patch), fields(client_id = %id))]
    async fn update(&self, id: ClientId, patch: ClientPatch) -> AppResult<Client> {
        self.executor
            .execute("clients.update", || async move {
                let mut client = self.fetch(id).await?;
                client.apply(&patch);
                self.write_back(&client).await
            })
            .await
    }

    #[instrument(skip(self), fields(client_id = %id))]
    async fn delete(&self, id: ClientId) -> AppResult<()> {
        self.executor
            .execute("clients.delete", || async move {
                let result = sqlx::query("DELETE FROM clients WHERE id = $1")
                    .bind(id.as_uuid())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("clients.delete", e))?;
                if result.rows_affected() == 0 {
                    return Err(AppError::not_found("Client", Some(&id.to_string())).into());
                }
                Ok(())
            })
            .await
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

const PROJECT_COLUMNS: &str = "id, name, description, status, priority, created_at";

#[derive(Debug)]
struct ProjectRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    status: String,
    priority: String,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProjectRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProjectRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            priority: row.try_get("priority")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl ProjectRow {
    fn into_project(self) -> anyhow::Result<Project> {
        Ok(Project::from_props(ProjectProps {
            id: ProjectId::from_uuid(self.id),
            name: ProjectName::new(&self.name)
                .map_err(|_| corrupt("projects", "name", &self.name))?,
            description: self.description,
            status: self
                .status
                .parse()
                .map_err(|_| corrupt("projects", "status", &self.status))?,
            priority: self
                .priority
                .parse()
                .map_err(|_| corrupt("projects", "priority", &self.priority))?,
            created_at: self.created_at,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
    executor: Executor,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool, executor: Executor) -> Self {
        Self { pool, executor }
    }

    async fn fetch(&self, id: ProjectId) -> anyhow::Result<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("projects.find_by_id", e))?;

        match row {
            Some(row) => row.into_project(),
            None => Err(AppError::not_found("Project", Some(&id.to_string())).into()),
        }
    }

    async fn list(&self, status: Option<ProjectStatus>) -> anyhow::Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(status.map(ProjectStatus::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("projects.list", e))?;

        rows.into_iter().map(ProjectRow::into_project).collect()
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    #[instrument(skip(self), fields(project_id = %id))]
    async fn find_by_id(&self, id: ProjectId) -> AppResult<Project> {
        self.executor
            .execute("projects.find_by_id", || self.fetch(id))
            .await
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Project>> {
        self.executor
            .execute("projects.find_all", || self.list(None))
            .await
    }

    #[instrument(skip(self), fields(status = status.as_str()))]
    async fn find_by_status(&self, status: ProjectStatus) -> AppResult<Vec<Project>> {
        self.executor
            .execute("projects.find_by_status", || self.list(Some(status)))
            .await
    }

    #[instrument(skip(self, project), fields(project_id = %project.id()))]
    async fn create(&self, project: Project) -> AppResult<Project> {
        self.executor
            .execute("projects.create", || async move {
                sqlx::query(&format!(
                    "INSERT INTO projects ({PROJECT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
                ))
                .bind(project.id().as_uuid())
                .bind(project.name().as_str())
                .bind(project.description())
                .bind(project.status().as_str())
                .bind(project.priority().as_str())
                .bind(project.created_at())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("projects.create", e))?;
                Ok(project)
            })
            .await
    }

    #[instrument(skip(self, patch), fields(project_id = %id))]
    async fn update(&self, id: ProjectId, patch: ProjectPatch) -> AppResult<Project> {
        self.executor
            .execute("projects.update", || async move {
                let mut project = self.fetch(id).await?;
                project.apply(&patch);

                let row = sqlx::query_as::<_, ProjectRow>(&format!(
                    r#"
                    UPDATE projects
                    SET name = $2, description = $3, status = $4, priority = $5
                    WHERE id = $1
                    RETURNING {PROJECT_COLUMNS}
                    "#
                ))
                .bind(id.as_uuid())
                .bind(project.name().as_str())
                .bind(project.description())
                .bind(project.status().as_str())
                .bind(project.priority().as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("projects.update", e))?;

                match row {
                    Some(row) => row.into_project(),
                    None => Err(AppError::not_found("Project", Some(&id.to_string())).into()),
                }
            })
            .await
    }

    #[instrument(skip(self), fields(project_id = %id))]
    async fn delete(&self, id: ProjectId) -> AppResult<()> {
        self.executor
            .execute("projects.delete", || async move {
                let result = sqlx::query("DELETE FROM projects WHERE id = $1")
                    .bind(id.as_uuid())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("projects.delete", e))?;
                if result.rows_affected() == 0 {
                    return Err(AppError::not_found("Project", Some(&id.to_string())).into());
                }
                Ok(())
            })
            .await
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

const FILE_COLUMNS: &str =
    "id, name, type, size_in_bytes, mime_type, path, description, uploaded_at";

#[derive(Debug)]
struct FileRow {
    id: uuid::Uuid,
    name: String,
    kind: String,
    size_in_bytes: i64,
    mime_type: String,
    path: String,
    description: Option<String>,
    uploaded_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for FileRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(FileRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            kind: row.try_get("type")?,
            size_in_bytes: row.try_get("size_in_bytes")?,
            mime_type: row.try_get("mime_type")?,
            path: row.try_get("path")?,
            description: row.try_get("description")?,
            uploaded_at: row.try_get("uploaded_at")?,
        })
    }
}

impl From<FileRow> for FileRecord {
    fn from(row: FileRow) -> Self {
        FileRecord::from_props(FileRecordProps {
            id: FileId::from_uuid(row.id),
            name: row.name,
            kind: FileKind::from_stored(&row.kind),
            size_in_bytes: row.size_in_bytes.max(0) as u64,
            mime_type: row.mime_type,
            path: row.path,
            description: row.description,
            uploaded_at: row.uploaded_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PostgresFileRepository {
    pool: PgPool,
    executor: Executor,
}

impl PostgresFileRepository {
    pub fn new(pool: PgPool, executor: Executor) -> Self {
        Self { pool, executor }
    }
}

#[async_trait]
impl FileRepository for PostgresFileRepository {
    #[instrument(skip(self), fields(file_id = %id))]
    async fn find_by_id(&self, id: FileId) -> AppResult<FileRecord> {
        self.executor
            .execute("files.find_by_id", || async move {
                let row = sqlx::query_as::<_, FileRow>(&format!(
                    "SELECT {FILE_COLUMNS} FROM files WHERE id = $1"
                ))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("files.find_by_id", e))?;

                row.map(FileRecord::from).ok_or_else(|| {
                    AppError::not_found("File", Some(&id.to_string())).into()
                })
            })
            .await
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<FileRecord>> {
        self.executor
            .execute("files.find_all", || async move {
                let rows = sqlx::query_as::<_, FileRow>(&format!(
                    "SELECT {FILE_COLUMNS} FROM files ORDER BY uploaded_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("files.find_all", e))?;
                Ok(rows.into_iter().map(FileRecord::from).collect())
            })
            .await
    }

    #[instrument(skip(self, record), fields(file_id = %record.id()))]
    async fn create(&self, record: FileRecord) -> AppResult<FileRecord> {
        self.executor
            .execute("files.create", || async move {
                sqlx::query(&format!(
                    "INSERT INTO files ({FILE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
                ))
                .bind(record.id().as_uuid())
                .bind(record.name())
                .bind(record.kind().as_str())
                .bind(to_i64(record.size_in_bytes()))
                .bind(record.mime_type())
                .bind(record.path())
                .bind(record.description())
                .bind(record.uploaded_at())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("files.create", e))?;
                Ok(record)
            })
            .await
    }

    #[instrument(skip(self), fields(file_id = %id))]
    async fn delete(&self, id: FileId) -> AppResult<()> {
        self.executor
            .execute("files.delete", || async move {
                let result = sqlx::query("DELETE FROM files WHERE id = $1")
                    .bind(id.as_uuid())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("files.delete", e))?;
                if result.rows_affected() == 0 {
                    return Err(AppError::not_found("File", Some(&id.to_string())).into());
                }
                Ok(())
            })
            .await
    }
}
