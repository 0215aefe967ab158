use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, OriginalUri, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    routing::get,
};

use entipedia_core::ClientId;

use crate::app::dto::{CreateClientRequest, ListClientsQuery, UpdateClientRequest};
use crate::app::errors::{Reply, instance_of};
use crate::app::routes::system::method_not_allowed;
use crate::app::services::AppServices;
use crate::app::validation::{json_body, path_id, query_params};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_clients)
                .post(create_client)
                .fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_client)
                .patch(update_client)
                .delete(delete_client)
                .fallback(method_not_allowed),
        )
}

pub fn location(id: &ClientId) -> String {
    format!("/api/v1/clients/{id}")
}

pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<ListClientsQuery>, QueryRejection>,
) -> Response {
    let result = match query_params(query) {
        Ok(query) => services.clients.list(query.page_request()).await,
        Err(e) => Err(e),
    };
    Reply::ok(result, instance_of(&uri)).into_response()
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<CreateClientRequest>, JsonRejection>,
) -> Response {
    let result = match json_body(body).and_then(CreateClientRequest::validate) {
        Ok(input) => services.clients.create(input).await,
        Err(e) => Err(e),
    };
    Reply::created(result, instance_of(&uri), |client| location(&client.id)).into_response()
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path_id::<ClientId>(id) {
        Ok(id) => services.clients.get(id).await,
        Err(e) => Err(e),
    };
    Reply::ok(result, instance_of(&uri)).into_response()
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateClientRequest>, JsonRejection>,
) -> Response {
    let input = path_id::<ClientId>(id).and_then(|id| {
        json_body(body)
            .and_then(UpdateClientRequest::validate)
            .map(|patch| (id, patch))
    });
    let result = match input {
        Ok((id, patch)) => services.clients.update(id, patch).await,
        Err(e) => Err(e),
    };
    Reply::ok(result, instance_of(&uri)).into_response()
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path_id::<ClientId>(id) {
        Ok(id) => services.clients.delete(id).await,
        Err(e) => Err(e),
    };
    Reply::no_content(result, instance_of(&uri)).into_response()
}
