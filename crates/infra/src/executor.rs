//! Repository operation executor.
//!
//! Repository bodies are written against `anyhow::Result` and may fail any way
//! they like (`?` on driver errors, returned `AppError`s, even panics). The
//! executor is the single place where those failures become `AppError` values.

use std::future::Future;

use tracing::error;

use entipedia_core::result::from_fallible_async;
use entipedia_core::{AppError, AppResult};

/// Message used when a failure carries no text of its own.
pub const FALLBACK_MESSAGE: &str = "Database operation failed";

#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    /// Log the full error chain of unexpected failures.
    verbose: bool,
}

impl Executor {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run `operation` to completion and fold every outcome into an `AppResult`.
    ///
    /// `AppError`s pass through unchanged. Any other error, or a panic while
    /// the operation runs, is logged and replaced by an `INTERNAL_SERVER_ERROR`.
    pub async fn execute<T, F, Fut>(&self, operation_name: &'static str, operation: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match from_fallible_async(async move { operation().await }).await {
            Ok(value) => Ok(value),
            Err(err) => Err(self.coerce(operation_name, err)),
        }
    }

    /// Convert an arbitrary failure into an `AppError`.
    pub fn coerce(&self, operation_name: &str, err: anyhow::Error) -> AppError {
        let err = match err.downcast::<AppError>() {
            Ok(app_error) => return app_error,
            Err(err) => err,
        };

        if self.verbose {
            error!(operation = operation_name, error = %err, chain = ?err, "repository operation failed");
        } else {
            error!(operation = operation_name, error = %err, "repository operation failed");
        }

        let message = err.to_string();
        if message.trim().is_empty() {
            AppError::internal(Some(FALLBACK_MESSAGE))
        } else {
            AppError::internal(Some(&message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entipedia_core::ErrorKind;

    #[tokio::test]
    async fn success_passes_through() {
        let out = Executor::default().execute("ok", || async { Ok(41 + 1) }).await;
        assert_eq!(out.unwrap(), 42);
    }

    #[tokio::test]
    async fn app_errors_keep_their_kind() {
        let out: AppResult<()> = Executor::default()
            .execute("lookup", || async {
                Err(AppError::not_found("Client", Some("abc")).into())
            })
            .await;

        let err = out.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "Client with id abc not found");
    }

    #[tokio::test]
    async fn foreign_errors_become_internal_with_their_message() {
        let out: AppResult<()> = Executor::new(true)
            .execute("insert", || async { Err(anyhow::anyhow!("connection refused")) })
            .await;

        let err = out.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.message(), "connection refused");
    }

    #[tokio::test]
    async fn empty_messages_fall_back() {
        let out: AppResult<()> = Executor::default()
            .execute("insert", || async { Err(anyhow::anyhow!("")) })
            .await;

        assert_eq!(out.unwrap_err().message(), FALLBACK_MESSAGE);
    }

    async fn explode() -> anyhow::Result<u8> {
        panic!("boom")
    }

    #[tokio::test]
    async fn panics_are_contained() {
        let out = Executor::default().execute("explode", explode).await;

        let err = out.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.message(), "boom");
    }

    #[tokio::test]
    async fn panics_before_the_future_exists_are_contained() {
        let out: AppResult<u8> = Executor::default()
            .execute("explode", || -> std::future::Ready<anyhow::Result<u8>> {
                panic!("boom")
            })
            .await;

        assert_eq!(out.unwrap_err().kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn app_errors_under_context_still_pass_through() {
        let out: AppResult<()> = Executor::default()
            .execute("wrapped", || async {
                Err(anyhow::Error::new(AppError::conflict("dup")).context("while inserting"))
            })
            .await;

        assert_eq!(out.unwrap_err().kind(), ErrorKind::Conflict);
    }
}
