//! Request-shape validation. Failures here become 400 `VALIDATION_ERROR`
//! problems without reaching a service.

use core::str::FromStr;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};

use entipedia_core::{AppError, FieldErrors};

pub const VALIDATION_FAILED: &str = "Validation failed";

/// Collects per-field messages, in field order.
#[derive(Debug, Default)]
pub struct FieldCheck {
    errors: FieldErrors,
}

impl FieldCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record `message` for `field` unless `ok` holds.
    pub fn ensure(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Keep the value of a successful parse; record the message of a failed one.
    pub fn take<T>(&mut self, field: &str, parsed: Result<T, AppError>) -> Option<T> {
        match parsed {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(field, err.message());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(VALIDATION_FAILED, self.errors))
        }
    }
}

/// Unwrap a JSON body, turning any rejection into a validation error.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::invalid_field("body", rejection.body_text())),
    }
}

/// Unwrap query parameters, turning any rejection into a validation error.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => Err(AppError::invalid_field("query", rejection.body_text())),
    }
}

/// Parse the `:id` path segment. A segment axum cannot decode (for example
/// invalid percent-encoded UTF-8) is reported against `id` like a bad id.
pub fn path_id<T>(path: Result<Path<String>, PathRejection>) -> Result<T, AppError>
where
    T: FromStr<Err = AppError>,
{
    match path {
        Ok(Path(raw)) => raw.parse(),
        Err(rejection) => Err(AppError::invalid_field("id", rejection.body_text())),
    }
}

/// Loose address check: one `@`, something before it, a dotted domain after it.
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// `parseInt`-style integer: optional sign then leading digits; anything else
/// after them is ignored. `None` when there are no digits.
pub fn lenient_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entipedia_core::{ClientId, ErrorKind};

    #[test]
    fn emails() {
        assert!(is_email("ana@example.do"));
        assert!(is_email("a.b+c@mail.example.com"));
        assert!(!is_email("ana"));
        assert!(!is_email("ana@localhost"));
        assert!(!is_email("@example.do"));
        assert!(!is_email("ana@@example.do"));
        assert!(!is_email("ana maria@example.do"));
        assert!(!is_email("ana@example."));
    }

    #[test]
    fn lenient_integers() {
        assert_eq!(lenient_int("2"), Some(2));
        assert_eq!(lenient_int(" 15abc"), Some(15));
        assert_eq!(lenient_int("-3"), Some(-3));
        assert_eq!(lenient_int("abc"), None);
        assert_eq!(lenient_int(""), None);
    }

    #[test]
    fn bad_path_ids_are_validation_errors() {
        let err = path_id::<ClientId>(Ok(Path("not-a-uuid".to_string()))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.http_status(), 400);

        let pd = serde_json::to_value(err.to_problem_details()).unwrap();
        assert_eq!(pd["errors"]["id"][0], "Invalid client id");
    }

    #[test]
    fn field_check_collects_messages() {
        let mut check = FieldCheck::new();
        check.ensure(false, "name", "Name is required");
        check.ensure(true, "email", "Invalid email");
        let kind: Option<u8> = check.take("type", Err(AppError::invalid_field("type", "bad type")));
        assert!(kind.is_none());

        let err = check.finish().unwrap_err();
        let pd = serde_json::to_value(err.to_problem_details()).unwrap();
        assert_eq!(pd["detail"], VALIDATION_FAILED);
        assert_eq!(pd["errors"]["name"][0], "Name is required");
        assert_eq!(pd["errors"]["type"][0], "bad type");
        assert!(pd["errors"].get("email").is_none());
    }

    #[test]
    fn empty_check_passes() {
        assert!(FieldCheck::new().finish().is_ok());
    }
}
