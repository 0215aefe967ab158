//! HTTP application wiring (Axum router + middleware).
//!
//! - `services.rs`: repository backend selection and service construction
//! - `routes/`: HTTP handlers, one file per resource
//! - `dto.rs`: request DTOs and their validation
//! - `validation.rs`: extractor rejections and field checks
//! - `errors.rs`: success and RFC 7807 problem responses

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use entipedia_infra::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;
pub mod validation;

pub use services::AppServices;

/// `*` allows any origin without credentials; anything else is one exact
/// origin with credentials.
fn cors_layer(origin: &str) -> CorsLayer {
    let origin = origin.trim();
    if origin == "*" {
        return CorsLayer::permissive();
    }

    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(value))
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]),
        Err(_) => {
            tracing::warn!(origin, "invalid CORS_ORIGIN; cross-origin requests are denied");
            CorsLayer::new()
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: AppServices, config: &AppConfig) -> Router {
    Router::new()
        .route(
            "/health",
            get(routes::system::health).fallback(routes::system::method_not_allowed),
        )
        .nest("/api/v1", routes::router())
        .fallback(routes::system::not_found)
        .layer(Extension(Arc::new(services)))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origin))
                .layer(CatchPanicLayer::custom(errors::panic_response)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = AppConfig {
            uploads_dir: std::env::temp_dir().join("entipedia-router-tests"),
            ..AppConfig::default()
        };
        build_app(AppServices::in_memory(&config), &config)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_routes_are_problems() {
        let response = app()
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            entipedia_core::APPLICATION_PROBLEM_JSON
        );
    }

    async fn problem_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn wrong_method_is_a_method_not_allowed_problem() {
        let response = app()
            .oneshot(
                Request::put("/api/v1/clients")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            entipedia_core::APPLICATION_PROBLEM_JSON
        );

        let value = problem_body(response).await;
        assert_eq!(value["type"], "METHOD_NOT_ALLOWED");
        assert_eq!(value["status"], 405);
        assert_eq!(value["detail"], "Method PUT not allowed on /api/v1/clients");
        assert_eq!(value["instance"], "/api/v1/clients");
    }

    #[tokio::test]
    async fn undecodable_path_id_is_a_validation_problem() {
        let response = app()
            .oneshot(
                Request::get("/api/v1/projects/%FF")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            entipedia_core::APPLICATION_PROBLEM_JSON
        );

        let value = problem_body(response).await;
        assert_eq!(value["type"], "VALIDATION_ERROR");
        assert!(value["errors"]["id"][0].is_string());
    }

    async fn explode() -> &'static str {
        panic!("boom")
    }

    #[tokio::test]
    async fn panics_become_internal_problems() {
        let app = Router::new()
            .route("/boom", get(explode))
            .layer(CatchPanicLayer::custom(errors::panic_response));

        let response = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["type"], "INTERNAL_SERVER_ERROR");
        assert_eq!(value["detail"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn exact_origin_is_echoed_with_credentials() {
        let response = app()
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "http://localhost:3001")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3001"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }
}
