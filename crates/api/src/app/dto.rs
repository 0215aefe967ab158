use serde::Deserialize;

use entipedia_application::{NewClient, NewProject};
use entipedia_clients::{ClientKind, ClientPatch};
use entipedia_core::{AppError, MoneyDop, PageRequest};
use entipedia_projects::{ProjectName, ProjectPatch, ProjectPriority, ProjectStatus};

use crate::app::validation::{FieldCheck, VALIDATION_FAILED, is_email, lenient_int};

pub const DESCRIPTION_MAX_CHARS: usize = 500;

// -------------------------
// Query DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClientsQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ListClientsQuery {
    /// Unparsable values fall back to the defaults.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.as_deref().and_then(lenient_int),
            self.page_size.as_deref().and_then(lenient_int),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    pub status: Option<String>,
}

impl ListProjectsQuery {
    pub fn status(&self) -> Result<Option<ProjectStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lifetime_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lifetime_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

// -------------------------
// Field rules
// -------------------------

fn check_contact(check: &mut FieldCheck, email: Option<&str>, phone: Option<&str>) {
    if let Some(email) = email {
        check.ensure(is_email(email.trim()), "email", "Invalid email");
    }
    if let Some(phone) = phone {
        check.ensure(
            phone.trim().chars().count() >= 3,
            "phone",
            "String must contain at least 3 character(s)",
        );
    }
}

fn check_lifetime_value(check: &mut FieldCheck, raw: Option<f64>) -> Option<MoneyDop> {
    let raw = raw?;
    if raw < 0.0 {
        check.add("lifetimeValue", "Number must be greater than or equal to 0");
        return None;
    }
    check.take("lifetimeValue", MoneyDop::from_amount(raw))
}

fn parse_kind(check: &mut FieldCheck, raw: Option<&str>) -> Option<ClientKind> {
    raw.and_then(|raw| check.take("type", raw.parse()))
}

fn parse_status(check: &mut FieldCheck, raw: Option<&str>) -> Option<ProjectStatus> {
    raw.and_then(|raw| check.take("status", raw.parse()))
}

fn parse_priority(check: &mut FieldCheck, raw: Option<&str>) -> Option<ProjectPriority> {
    raw.and_then(|raw| check.take("priority", raw.parse()))
}

// Only reachable if a required field was skipped without being recorded.
fn incomplete() -> AppError {
    AppError::validation(VALIDATION_FAILED, Default::default())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl CreateClientRequest {
    pub fn validate(self) -> Result<NewClient, AppError> {
        let mut check = FieldCheck::new();

        let name = non_blank(self.name.as_deref()).map(str::to_string);
        check.ensure(name.is_some(), "name", "Name is required");

        check.ensure(self.kind.is_some(), "type", "Required");
        let kind = parse_kind(&mut check, self.kind.as_deref());

        check_contact(&mut check, self.email.as_deref(), self.phone.as_deref());
        let lifetime_value = check_lifetime_value(&mut check, self.lifetime_value);

        check.finish()?;
        match (name, kind) {
            (Some(name), Some(kind)) => Ok(NewClient {
                name,
                kind,
                email: self.email,
                phone: self.phone,
                lifetime_value,
            }),
            _ => Err(incomplete()),
        }
    }
}

impl UpdateClientRequest {
    pub fn validate(self) -> Result<ClientPatch, AppError> {
        let mut check = FieldCheck::new();

        if let Some(name) = self.name.as_deref() {
            check.ensure(!name.trim().is_empty(), "name", "Name cannot be empty");
        }
        let kind = parse_kind(&mut check, self.kind.as_deref());
        check_contact(&mut check, self.email.as_deref(), self.phone.as_deref());
        let lifetime_value = check_lifetime_value(&mut check, self.lifetime_value);

        check.finish()?;
        Ok(ClientPatch {
            name: self.name.map(|n| n.trim().to_string()),
            kind,
            email: self.email,
            phone: self.phone,
            lifetime_value,
        })
    }
}

impl CreateProjectRequest {
    pub fn validate(self) -> Result<NewProject, AppError> {
        let mut check = FieldCheck::new();

        let name = match self.name.as_deref() {
            Some(raw) => check.take("name", ProjectName::new(raw)),
            None => {
                check.add("name", "Name is required");
                None
            }
        };
        let description = non_blank(self.description.as_deref()).map(str::to_string);
        check.ensure(description.is_some(), "description", "Description is required");

        let status = parse_status(&mut check, self.status.as_deref());
        let priority = parse_priority(&mut check, self.priority.as_deref());

        check.finish()?;
        match (name, description) {
            (Some(name), Some(description)) => Ok(NewProject {
                name,
                description,
                status,
                priority,
            }),
            _ => Err(incomplete()),
        }
    }
}

impl UpdateProjectRequest {
    pub fn validate(self) -> Result<ProjectPatch, AppError> {
        let mut check = FieldCheck::new();

        let name = self
            .name
            .as_deref()
            .and_then(|raw| check.take("name", ProjectName::new(raw)));
        if let Some(description) = self.description.as_deref() {
            check.ensure(
                !description.trim().is_empty(),
                "description",
                "Description cannot be empty",
            );
        }
        let status = parse_status(&mut check, self.status.as_deref());
        let priority = parse_priority(&mut check, self.priority.as_deref());

        check.finish()?;
        Ok(ProjectPatch {
            name,
            description: self.description,
            status,
            priority,
        })
    }
}

/// Optional upload description: 1 to 500 characters after trimming.
pub fn validate_description(raw: Option<String>) -> Result<Option<String>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > DESCRIPTION_MAX_CHARS {
        return Err(AppError::invalid_field(
            "description",
            format!("Description must be between 1 and {DESCRIPTION_MAX_CHARS} characters"),
        ));
    }
    Ok(Some(trimmed.to_string()))
}
