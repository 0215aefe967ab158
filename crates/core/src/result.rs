//! Result helpers.
//!
//! `std::result::Result` is the success/failure container; this module adds the
//! constructors and the lifting functions that turn fallible code (including
//! code that panics) into a plain `Result` value.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;

const PANIC_FALLBACK: &str = "operation panicked";

/// Wrap a value as a success.
pub fn success<T, E>(value: T) -> Result<T, E> {
    Ok(value)
}

/// Wrap an error as a failure value.
pub fn failure<T, E>(error: E) -> Result<T, E> {
    Err(error)
}

/// Await a fallible future and capture every way it can fail.
///
/// An `Err` output becomes a failure; a panic while polling is caught and
/// coerced into an error carrying the panic message. Nothing escapes.
pub async fn from_fallible_async<T, E, Fut>(operation: Fut) -> Result<T, anyhow::Error>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<anyhow::Error>,
{
    match AssertUnwindSafe(operation).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.into()),
        Err(payload) => Err(anyhow::Error::msg(panic_message(payload.as_ref()))),
    }
}

/// Synchronous analogue of [`from_fallible_async`]: the returned function never
/// panics, failures (returned or panicked) come back as `Err`.
pub fn from_fallible_sync<A, T, E, F>(f: F) -> impl Fn(A) -> Result<T, anyhow::Error>
where
    F: Fn(A) -> Result<T, E>,
    E: Into<anyhow::Error>,
{
    move |args| match panic::catch_unwind(AssertUnwindSafe(|| f(args))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.into()),
        Err(payload) => Err(anyhow::Error::msg(panic_message(payload.as_ref()))),
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        PANIC_FALLBACK.to_string()
    }
}
