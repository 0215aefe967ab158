//! Project tracking (kanban) domain.

pub mod project;
pub mod repository;
pub mod value_objects;

pub use project::{Project, ProjectPatch, ProjectProps};
pub use repository::ProjectRepository;
pub use value_objects::{ProjectName, ProjectPriority, ProjectStatus};
