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

use entipedia_core::ProjectId;

use crate::app::dto::{CreateProjectRequest, ListProjectsQuery, UpdateProjectRequest};
use crate::app::errors::{Reply, instance_of};
use crate::app::routes::system::method_not_allowed;
use crate::app::services::AppServices;
use crate::app::validation::{json_body, path_id, query_params};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_projects)
                .post(create_project)
                .fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_project)
                .patch(update_project)
                .delete(delete_project)
                .fallback(method_not_allowed),
        )
}

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<ListProjectsQuery>, QueryRejection>,
) -> Response {
    let result = match query_params(query).and_then(|query| query.status()) {
        Ok(status) => services.projects.list(status).await,
        Err(e) => Err(e),
    };
    Reply::ok(result, instance_of(&uri)).into_response()
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Response {
    let result = match json_body(body).and_then(CreateProjectRequest::validate) {
        Ok(input) => services.projects.create(input).await,
        Err(e) => Err(e),
    };
    Reply::created(result, instance_of(&uri), |project| {
        format!("/api/v1/projects/{}", project.id)
    })
    .into_response()
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path_id::<ProjectId>(id) {
        Ok(id) => services.projects.get(id).await,
        Err(e) => Err(e),
    };
    Reply::ok(result, instance_of(&uri)).into_response()
}

/// Field edits and kanban moves (`{"status": "..."}`) share this route.
pub async fn update_project(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> Response {
    let input = path_id::<ProjectId>(id).and_then(|id| {
        json_body(body)
            .and_then(UpdateProjectRequest::validate)
            .map(|patch| (id, patch))
    });
    let result = match input {
        Ok((id, patch)) => services.projects.update(id, patch).await,
        Err(e) => Err(e),
    };
    Reply::ok(result, instance_of(&uri)).into_response()
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path_id::<ProjectId>(id) {
        Ok(id) => services.projects.delete(id).await,
        Err(e) => Err(e),
    };
    Reply::no_content(result, instance_of(&uri)).into_response()
}
