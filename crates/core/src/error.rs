//! Application error model.
//!
//! Every failure that can reach a client is an [`AppError`]: a closed
//! [`ErrorKind`] tag (stable code + HTTP status) plus a human message and
//! optional structured details that surface in the problem document.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::problem::ProblemDetails;

/// Result type used across repositories, services and handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Field-level validation messages, keyed by request field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Closed set of failure kinds.
///
/// New failure reasons are expressed as details on an existing kind (usually
/// [`ErrorKind::Internal`]) or by adding a variant here, never by inventing a
/// status code at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    MethodNotAllowed,
    Validation,
    Unauthorized,
    Forbidden,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code (problem `type`).
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Validation => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP status code clients receive for this kind.
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }

    /// Human label used as the problem `title`.
    pub fn title(self) -> &'static str {
        match self {
            Self::NotFound => "NotFoundError",
            Self::MethodNotAllowed => "MethodNotAllowedError",
            Self::Validation => "ValidationError",
            Self::Unauthorized => "UnauthorizedError",
            Self::Forbidden => "ForbiddenError",
            Self::Conflict => "ConflictError",
            Self::Internal => "InternalServerError",
        }
    }
}

/// Structured application error.
///
/// Immutable after construction: fields are private and only readable through
/// accessors.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    details: Option<Map<String, Value>>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Lookup miss: `"{resource} with id {id} not found"`.
    pub fn not_found(resource: &str, identifier: Option<&str>) -> Self {
        let message = match identifier {
            Some(id) => format!("{resource} with id {id} not found"),
            None => format!("{resource} not found"),
        };
        Self::new(ErrorKind::NotFound, message)
    }

    /// Request-shape failure. Non-empty `errors` surface as a top-level
    /// `errors` member of the problem document.
    pub fn validation(message: impl Into<String>, errors: FieldErrors) -> Self {
        let err = Self::new(ErrorKind::Validation, message);
        if errors.is_empty() {
            return err;
        }

        let errors = errors
            .into_iter()
            .map(|(field, msgs)| (field, Value::from(msgs)))
            .collect::<Map<String, Value>>();
        let mut details = Map::new();
        details.insert("errors".to_string(), Value::Object(errors));
        err.with_details(details)
    }

    /// Validation failure for a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.clone()]);
        Self::validation(message, errors)
    }

    pub fn unauthorized(message: Option<&str>) -> Self {
        Self::new(ErrorKind::Unauthorized, message.unwrap_or("Unauthorized"))
    }

    pub fn forbidden(message: Option<&str>) -> Self {
        Self::new(ErrorKind::Forbidden, message.unwrap_or("Forbidden"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn internal(message: Option<&str>) -> Self {
        Self::new(
            ErrorKind::Internal,
            message.unwrap_or("An internal server error occurred"),
        )
    }

    /// Attach structured details (merged into the problem document).
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Map<String, Value>> {
        self.details.as_ref()
    }

    /// RFC 7807 projection (no `instance`; the HTTP layer sets it).
    pub fn to_problem_details(&self) -> ProblemDetails {
        let mut problem = ProblemDetails::new(
            self.code(),
            self.kind.title(),
            self.http_status(),
            self.message.clone(),
        );
        if let Some(details) = &self.details {
            for (key, value) in details {
                problem.insert_extension(key, value.clone());
            }
        }
        problem
    }
}
