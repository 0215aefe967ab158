//! `entipedia-core`: shared building blocks.
//!
//! Error taxonomy, result helpers, RFC 7807 problem details, identifiers,
//! value objects and pagination. No IO and no HTTP framework types.

pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;
pub mod problem;
pub mod result;
pub mod value_object;

pub use entity::Entity;
pub use error::{AppError, AppResult, ErrorKind, FieldErrors};
pub use id::{ClientId, FileId, ProjectId};
pub use pagination::{Page, PageRequest};
pub use problem::{APPLICATION_PROBLEM_JSON, ProblemDetails};
pub use value_object::{MoneyDop, ValueObject};
