//! Problem-response mapper.
//!
//! Every handler ends by turning an `AppResult` into exactly one HTTP response:
//! successes become JSON (or an empty 204), failures become an RFC 7807
//! `application/problem+json` document whose `instance` is the request path.

use std::any::Any;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::Level;

use entipedia_core::result::panic_message;
use entipedia_core::{APPLICATION_PROBLEM_JSON, AppError, AppResult};

/// Served if a problem document cannot be serialized.
const FALLBACK_PROBLEM: &[u8] = br#"{"type":"INTERNAL_SERVER_ERROR","title":"InternalServerError","status":500,"detail":"An internal server error occurred"}"#;

/// Log level for a failed request: server errors are errors, client errors are
/// warnings, anything else is informational.
pub fn failure_level(status: u16) -> Level {
    match status {
        500..=u16::MAX => Level::ERROR,
        400..=499 => Level::WARN,
        _ => Level::INFO,
    }
}

pub fn log_failure(error: &AppError, instance: Option<&str>) {
    let code = error.code();
    let http_status = error.http_status();
    let instance = instance.unwrap_or("");

    match failure_level(http_status) {
        Level::ERROR => {
            tracing::error!(code, http_status, instance, "{}", error.message())
        }
        Level::WARN => {
            tracing::warn!(code, http_status, instance, "{}", error.message())
        }
        _ => tracing::info!(code, http_status, instance, "{}", error.message()),
    }
}

/// `instance` member for a request: path plus query string.
pub fn instance_of(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Serialized problem document. Pure: same error and instance, same bytes.
pub fn problem_body(error: &AppError, instance: Option<&str>) -> Vec<u8> {
    let mut problem = error.to_problem_details();
    if let Some(instance) = instance.filter(|i| !i.is_empty()) {
        problem = problem.with_instance(instance);
    }
    serde_json::to_vec(&problem).unwrap_or_else(|_| FALLBACK_PROBLEM.to_vec())
}

/// Log the failure and render it as a problem response.
pub fn problem_response(error: &AppError, instance: Option<&str>) -> Response {
    log_failure(error, instance);

    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        )],
        problem_body(error, instance),
    )
        .into_response()
}

/// Response for a panic caught by the panic layer.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!(panic = %panic_message(payload.as_ref()), "handler panicked");
    problem_response(&AppError::internal(None), None)
}

enum Success {
    Ok,
    Created { location: Option<String> },
    NoContent,
}

/// Outcome of a handler, rendered exactly once by `into_response`.
#[must_use]
pub struct Reply<T> {
    result: AppResult<T>,
    instance: String,
    success: Success,
}

impl<T> Reply<T> {
    /// 200 with the value as JSON.
    pub fn ok(result: AppResult<T>, instance: impl Into<String>) -> Self {
        Self {
            result,
            instance: instance.into(),
            success: Success::Ok,
        }
    }

    /// 201 with the value as JSON and a `Location` header built from it.
    pub fn created(
        result: AppResult<T>,
        instance: impl Into<String>,
        location: impl FnOnce(&T) -> String,
    ) -> Self {
        let location = result.as_ref().ok().map(location);
        Self {
            result,
            instance: instance.into(),
            success: Success::Created { location },
        }
    }
}

impl Reply<()> {
    /// 204 with an empty body.
    pub fn no_content(result: AppResult<()>, instance: impl Into<String>) -> Self {
        Self {
            result,
            instance: instance.into(),
            success: Success::NoContent,
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let value = match self.result {
            Ok(value) => value,
            Err(err) => return problem_response(&err, Some(&self.instance)),
        };

        match self.success {
            Success::Ok => (StatusCode::OK, Json(value)).into_response(),
            Success::Created {
                location: Some(location),
            } => (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(value),
            )
                .into_response(),
            Success::Created { location: None } => {
                (StatusCode::CREATED, Json(value)).into_response()
            }
            Success::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    use entipedia_core::FieldErrors;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    /// Run `f` with a subscriber that records every event.
    fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, logs.text())
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn levels_follow_status() {
        assert_eq!(failure_level(404), Level::WARN);
        assert_eq!(failure_level(400), Level::WARN);
        assert_eq!(failure_level(500), Level::ERROR);
        assert_eq!(failure_level(503), Level::ERROR);
        assert_eq!(failure_level(302), Level::INFO);
    }

    #[test]
    fn same_failure_same_bytes() {
        let err = AppError::not_found("Client", Some("abc"));
        let a = problem_body(&err, Some("/api/v1/clients/abc"));
        let b = problem_body(&err, Some("/api/v1/clients/abc"));
        assert_eq!(a, b);

        let value: serde_json::Value = serde_json::from_slice(&a).unwrap();
        assert_eq!(value["instance"], "/api/v1/clients/abc");
        assert_eq!(value["status"], 404);
    }

    #[tokio::test]
    async fn failure_renders_problem_json() {
        let mut errors = FieldErrors::new();
        errors.insert("name".to_string(), vec!["Name is required".to_string()]);
        let reply: Reply<()> = Reply::ok(
            Err(AppError::validation("Validation failed", errors)),
            "/api/v1/clients",
        );

        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            APPLICATION_PROBLEM_JSON
        );

        let value: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(value["status"], 400);
        assert_eq!(value["type"], "VALIDATION_ERROR");
        assert_eq!(value["errors"]["name"][0], "Name is required");
    }

    #[tokio::test]
    async fn created_sets_location() {
        let reply = Reply::created(Ok(7u32), "/api/v1/things", |id| {
            format!("/api/v1/things/{id}")
        });

        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/api/v1/things/7");
        assert_eq!(body_bytes(response).await, b"7");
    }

    #[tokio::test]
    async fn no_content_has_empty_body() {
        let response = Reply::no_content(Ok(()), "/x").into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(response).await.is_empty());
    }

    #[test]
    fn failures_log_at_their_level() {
        let (_, logs) = capture(|| {
            problem_response(&AppError::not_found("Client", Some("abc")), Some("/c/abc"))
        });
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Client with id abc not found"));
        assert!(logs.contains("NOT_FOUND"));

        let (_, logs) = capture(|| problem_response(&AppError::internal(None), Some("/c")));
        assert!(logs.contains("ERROR"));
    }

    #[test]
    fn success_does_not_log() {
        let (_, logs) = capture(|| Reply::ok(Ok("fine"), "/ok").into_response());
        assert!(logs.is_empty());
    }

    #[test]
    fn instance_keeps_the_query_string() {
        let uri: Uri = "/api/v1/clients?page=2&pageSize=5".parse().unwrap();
        assert_eq!(instance_of(&uri), "/api/v1/clients?page=2&pageSize=5");
    }
}
