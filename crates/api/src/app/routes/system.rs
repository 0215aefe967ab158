use axum::{
    Json,
    extract::OriginalUri,
    http::{Method, Uri},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use entipedia_core::{AppError, ErrorKind};

use crate::app::errors::{instance_of, problem_response};

pub async fn health() -> Response {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
    .into_response()
}

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    let error = AppError::new(
        ErrorKind::NotFound,
        format!("Route {} {} not found", method, uri.path()),
    );
    problem_response(&error, Some(&instance_of(&uri)))
}

/// Fallback for a known path hit with a method it does not serve.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    let error = AppError::new(
        ErrorKind::MethodNotAllowed,
        format!("Method {} not allowed on {}", method, uri.path()),
    );
    problem_response(&error, Some(&instance_of(&uri)))
}
