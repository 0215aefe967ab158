//! Infrastructure layer: configuration, operation executor, database, repository
//! implementations and local file storage.

pub mod config;
pub mod db;
pub mod executor;
pub mod repositories;
pub mod storage;

pub use config::{AppConfig, ConfigError, Environment};
pub use executor::Executor;
pub use storage::LocalFileStorage;
