//! Application services: orchestrate repositories and storage, map domain
//! values to response DTOs. Every method returns `AppResult`.

pub mod clients;
pub mod files;
pub mod projects;

pub use clients::{ClientResponse, ClientService, NewClient};
pub use files::{Download, FileResponse, FileService, NewUpload};
pub use projects::{NewProject, ProjectResponse, ProjectService};
