//! Client directory domain.
//!
//! Entity, value types and the repository port. No IO, no HTTP.

pub mod client;
pub mod repository;

pub use client::{Client, ClientKind, ClientPatch, ClientProps};
pub use repository::ClientRepository;
