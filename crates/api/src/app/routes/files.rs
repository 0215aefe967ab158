use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Extension, Multipart, OriginalUri, Path,
        multipart::{MultipartError, MultipartRejection},
        rejection::PathRejection,
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

use entipedia_application::{Download, NewUpload};
use entipedia_core::{AppError, AppResult, FileId};

use crate::app::dto::validate_description;
use crate::app::errors::{Reply, instance_of, problem_response};
use crate::app::routes::system::method_not_allowed;
use crate::app::services::AppServices;
use crate::app::validation::path_id;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_files)
                .post(upload_file)
                .fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_file).delete(delete_file).fallback(method_not_allowed),
        )
        .route(
            "/:id/download",
            get(download_file).fallback(method_not_allowed),
        )
}

fn multipart_failure(err: MultipartError) -> AppError {
    AppError::invalid_field("file", err.body_text())
}

/// Read the `file` part and the optional `description` part. Unknown parts
/// are skipped.
async fn read_upload(multipart: Result<Multipart, MultipartRejection>) -> AppResult<NewUpload> {
    let mut multipart =
        multipart.map_err(|rejection| AppError::invalid_field("file", rejection.body_text()))?;

    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_failure)? {
        let part = field.name().map(str::to_string);
        match part.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("file").to_string();
                let mime_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_failure)?;
                file = Some((name, mime_type, bytes.to_vec()));
            }
            Some("description") => {
                description = Some(field.text().await.map_err(multipart_failure)?);
            }
            _ => {}
        }
    }

    let Some((original_name, mime_type, bytes)) = file else {
        return Err(AppError::invalid_field("file", "File is required"));
    };

    Ok(NewUpload {
        original_name,
        mime_type,
        bytes,
        description: validate_description(description)?,
    })
}

/// `attachment` disposition; falls back to a bare `attachment` when the name
/// is not a valid header value.
fn content_disposition(name: &str) -> HeaderValue {
    let escaped = name.replace(['"', '\\'], "_");
    HeaderValue::from_str(&format!("attachment; filename=\"{escaped}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn download_response(download: Download) -> Response {
    let content_type = HeaderValue::from_str(&download.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, content_disposition(&download.name)),
        ],
        download.bytes,
    )
        .into_response()
}

pub async fn list_files(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    Reply::ok(services.files.list().await, instance_of(&uri)).into_response()
}

pub async fn upload_file(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = match read_upload(multipart).await {
        Ok(upload) => services.files.upload(upload).await,
        Err(e) => Err(e),
    };
    Reply::created(result, instance_of(&uri), |file| {
        format!("/api/v1/files/{}", file.id)
    })
    .into_response()
}

pub async fn get_file(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path_id::<FileId>(id) {
        Ok(id) => services.files.get(id).await,
        Err(e) => Err(e),
    };
    Reply::ok(result, instance_of(&uri)).into_response()
}

pub async fn download_file(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path_id::<FileId>(id) {
        Ok(id) => services.files.download(id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(download) => download_response(download),
        Err(e) => problem_response(&e, Some(&instance_of(&uri))),
    }
}

pub async fn delete_file(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path_id::<FileId>(id) {
        Ok(id) => services.files.delete(id).await,
        Err(e) => Err(e),
    };
    Reply::no_content(result, instance_of(&uri)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_quotes_the_name() {
        assert_eq!(
            content_disposition("Contrato final.pdf"),
            "attachment; filename=\"Contrato final.pdf\""
        );
        assert_eq!(
            content_disposition("a\"b.txt"),
            "attachment; filename=\"a_b.txt\""
        );
    }

    #[test]
    fn control_characters_fall_back() {
        assert_eq!(content_disposition("bad\nname"), "attachment");
    }
}
