use axum::Router;

pub mod clients;
pub mod files;
pub mod projects;
pub mod system;

/// Router for everything under `/api/v1`.
pub fn router() -> Router {
    Router::new()
        .nest("/clients", clients::router())
        .nest("/projects", projects::router())
        .nest("/files", files::router())
}
