//! Repository implementations: in-memory (development, tests) and Postgres.

pub mod memory;
pub mod postgres;

pub use memory::{
    InMemoryClientRepository, InMemoryFileRepository, InMemoryProjectRepository, InMemoryTable,
};
pub use postgres::{PostgresClientRepository, PostgresFileRepository, PostgresProjectRepository};
