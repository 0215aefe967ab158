//! Service wiring: picks the repository backend and builds the application
//! services shared by every handler.

use std::sync::Arc;

use entipedia_application::{ClientService, FileService, ProjectService};
use entipedia_clients::ClientRepository;
use entipedia_files::{FileRepository, FileStorage};
use entipedia_infra::repositories::{
    InMemoryClientRepository, InMemoryFileRepository, InMemoryProjectRepository,
    PostgresClientRepository, PostgresFileRepository, PostgresProjectRepository,
};
use entipedia_infra::{AppConfig, Executor, LocalFileStorage, db};
use entipedia_projects::ProjectRepository;

#[derive(Clone)]
pub struct AppServices {
    pub clients: ClientService,
    pub projects: ProjectService,
    pub files: FileService,
}

struct Repositories {
    clients: Arc<dyn ClientRepository>,
    projects: Arc<dyn ProjectRepository>,
    files: Arc<dyn FileRepository>,
}

impl Repositories {
    fn in_memory(executor: Executor) -> Self {
        Self {
            clients: Arc::new(InMemoryClientRepository::new(executor)),
            projects: Arc::new(InMemoryProjectRepository::new(executor)),
            files: Arc::new(InMemoryFileRepository::new(executor)),
        }
    }

    async fn postgres(url: &str, executor: Executor) -> anyhow::Result<Self> {
        let pool = db::connect(url).await?;
        db::ensure_schema(&pool).await?;
        Ok(Self {
            clients: Arc::new(PostgresClientRepository::new(pool.clone(), executor)),
            projects: Arc::new(PostgresProjectRepository::new(pool.clone(), executor)),
            files: Arc::new(PostgresFileRepository::new(pool, executor)),
        })
    }
}

impl AppServices {
    /// Postgres when `DATABASE_URL` is set, in-memory otherwise. Creates the
    /// uploads directory.
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let executor = Executor::new(config.verbose_diagnostics());

        let repositories = match config.database_url.as_deref() {
            Some(url) => {
                tracing::info!("using postgres repositories");
                Repositories::postgres(url, executor).await?
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory repositories");
                Repositories::in_memory(executor)
            }
        };

        let storage = LocalFileStorage::new(&config.uploads_dir);
        storage.ensure_root().await?;

        Ok(Self::assemble(repositories, Arc::new(storage), config))
    }

    /// In-memory repositories over the configured uploads directory. The
    /// directory is created on first upload.
    pub fn in_memory(config: &AppConfig) -> Self {
        let executor = Executor::new(config.verbose_diagnostics());
        Self::assemble(
            Repositories::in_memory(executor),
            Arc::new(LocalFileStorage::new(&config.uploads_dir)),
            config,
        )
    }

    fn assemble(
        repositories: Repositories,
        storage: Arc<dyn FileStorage>,
        config: &AppConfig,
    ) -> Self {
        Self {
            clients: ClientService::new(repositories.clients),
            projects: ProjectService::new(repositories.projects),
            files: FileService::new(repositories.files, storage, config.api_base_url.clone()),
        }
    }
}
