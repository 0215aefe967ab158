use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use entipedia_core::{AppError, ClientId, Entity, MoneyDop};

/// Client kind: natural person or company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientKind {
    Person,
    Company,
}

impl ClientKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Company => "COMPANY",
        }
    }
}

impl core::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ClientKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERSON" => Ok(Self::Person),
            "COMPANY" => Ok(Self::Company),
            _ => Err(AppError::invalid_field(
                "type",
                "Invalid enum value. Expected 'PERSON' | 'COMPANY'",
            )),
        }
    }
}

/// Full attribute set of a client (used to build or restore one).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientProps {
    pub id: ClientId,
    pub name: String,
    pub kind: ClientKind,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Approximate value of the client (estimated billing).
    pub lifetime_value: Option<MoneyDop>,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a client; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub kind: Option<ClientKind>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lifetime_value: Option<MoneyDop>,
}

/// Entity: a client in the directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    props: ClientProps,
}

impl Client {
    pub fn from_props(props: ClientProps) -> Self {
        Self { props }
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn kind(&self) -> ClientKind {
        self.props.kind
    }

    pub fn email(&self) -> Option<&str> {
        self.props.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.props.phone.as_deref()
    }

    pub fn lifetime_value(&self) -> Option<MoneyDop> {
        self.props.lifetime_value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.props.created_at
    }

    pub fn into_props(self) -> ClientProps {
        self.props
    }

    /// Replace email and/or phone; provided values are trimmed.
    pub fn update_contact_info(&mut self, email: Option<&str>, phone: Option<&str>) {
        if let Some(email) = email {
            self.props.email = Some(email.trim().to_string());
        }
        if let Some(phone) = phone {
            self.props.phone = Some(phone.trim().to_string());
        }
    }

    pub fn update_lifetime_value(&mut self, amount: MoneyDop) {
        self.props.lifetime_value = Some(amount);
    }

    /// Apply an inline edit. Identity and creation time never change.
    pub fn apply(&mut self, patch: &ClientPatch) {
        if let Some(name) = &patch.name {
            self.props.name = name.trim().to_string();
        }
        if let Some(kind) = patch.kind {
            self.props.kind = kind;
        }
        self.update_contact_info(patch.email.as_deref(), patch.phone.as_deref());
        if let Some(amount) = patch.lifetime_value {
            self.update_lifetime_value(amount);
        }
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.props.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Client {
        Client::from_props(ClientProps {
            id: ClientId::new(),
            name: "Acme SRL".to_string(),
            kind: ClientKind::Company,
            email: Some("ventas@acme.do".to_string()),
            phone: None,
            lifetime_value: None,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn kind_parses_wire_values() {
        assert_eq!("PERSON".parse::<ClientKind>().unwrap(), ClientKind::Person);
        assert_eq!("COMPANY".parse::<ClientKind>().unwrap(), ClientKind::Company);

        let err = "company".parse::<ClientKind>().unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn patch_changes_only_provided_fields() {
        let mut client = sample();
        let id = *client.id();
        let created_at = client.created_at();

        client.apply(&ClientPatch {
            phone: Some("  809-555-0101 ".to_string()),
            lifetime_value: Some(MoneyDop::from_amount(1500.0).unwrap()),
            ..ClientPatch::default()
        });

        assert_eq!(client.name(), "Acme SRL");
        assert_eq!(client.email(), Some("ventas@acme.do"));
        assert_eq!(client.phone(), Some("809-555-0101"));
        assert_eq!(client.lifetime_value().unwrap().cents(), 150_000);
        assert_eq!(*client.id(), id);
        assert_eq!(client.created_at(), created_at);
    }
}
