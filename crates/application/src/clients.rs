use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use entipedia_clients::{Client, ClientKind, ClientPatch, ClientProps, ClientRepository};
use entipedia_core::{AppResult, ClientId, Entity, MoneyDop, Page, PageRequest};

/// Validated input for a new client.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub name: String,
    pub kind: ClientKind,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lifetime_value: Option<MoneyDop>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: ClientId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ClientKind,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lifetime_value: Option<MoneyDop>,
    pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        let ClientProps {
            id,
            name,
            kind,
            email,
            phone,
            lifetime_value,
            created_at,
        } = client.into_props();
        Self {
            id,
            name,
            kind,
            email,
            phone,
            lifetime_value,
            created_at,
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[derive(Clone)]
pub struct ClientService {
    repository: Arc<dyn ClientRepository>,
}

impl ClientService {
    pub fn new(repository: Arc<dyn ClientRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, request: PageRequest) -> AppResult<Page<ClientResponse>> {
        let page = self.repository.find_page(request).await?;
        Ok(page.map(ClientResponse::from))
    }

    pub async fn get(&self, id: ClientId) -> AppResult<ClientResponse> {
        self.repository.find_by_id(id).await.map(ClientResponse::from)
    }

    pub async fn create(&self, input: NewClient) -> AppResult<ClientResponse> {
        let client = Client::from_props(ClientProps {
            id: ClientId::new(),
            name: input.name.trim().to_string(),
            kind: input.kind,
            email: trimmed(input.email),
            phone: trimmed(input.phone),
            lifetime_value: input.lifetime_value,
            created_at: Utc::now(),
        });

        let created = self.repository.create(client).await?;
        info!(client_id = %created.id(), "client created");
        Ok(created.into())
    }

    pub async fn update(&self, id: ClientId, patch: ClientPatch) -> AppResult<ClientResponse> {
        self.repository.update(id, patch).await.map(ClientResponse::from)
    }

    pub async fn delete(&self, id: ClientId) -> AppResult<()> {
        self.repository.delete(id).await?;
        info!(client_id = %id, "client deleted");
        Ok(())
    }
}
