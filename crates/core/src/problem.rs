//! RFC 7807 "problem details" wire entity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Media type for problem documents.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

const RESERVED_MEMBERS: [&str; 5] = ["type", "title", "status", "detail", "instance"];

/// Problem document returned for every failed request.
///
/// Extension members are flattened next to the fixed members, so a validation
/// problem serializes as `{"type":..,"title":..,"status":..,"detail":..,"errors":{..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    problem_type: String,
    title: String,
    status: u16,
    detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instance: Option<String>,
    #[serde(flatten)]
    extensions: Map<String, Value>,
}

impl ProblemDetails {
    pub fn new(
        problem_type: impl Into<String>,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            problem_type: problem_type.into(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: None,
            extensions: Map::new(),
        }
    }

    /// Set the request path the problem occurred on.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Add an extension member. Names of the fixed members are ignored.
    pub fn insert_extension(&mut self, key: &str, value: Value) {
        if RESERVED_MEMBERS.contains(&key) {
            return;
        }
        self.extensions.insert(key.to_string(), value);
    }

    pub fn problem_type(&self) -> &str {
        &self.problem_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }
}
