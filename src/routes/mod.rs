// Route exports
pub mod admin;
pub mod courses;
pub mod health;
pub mod rounds;

use actix_web::{error, http::header, web, HttpRequest};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::SearchPipeline;
use crate::error::ActionError;
use crate::models::Caller;
use crate::services::{CacheManager, CourseStore, IdentityVerifier};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CourseStore>,
    pub cache: Arc<CacheManager>,
    pub identity: Arc<IdentityVerifier>,
    pub search: SearchPipeline,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(courses::configure)
            .configure(rounds::configure)
            .configure(admin::configure),
    );
}

/// JSON extractor settings with failures rendered as tagged error bodies
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

/// Query extractor settings with failures rendered as tagged error bodies
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(handle_query_payload_error)
}

fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ActionError::BadRequest(format!("Invalid JSON: {}", err)).into()
}

fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    ActionError::BadRequest(format!("Invalid query: {}", err)).into()
}

/// Verify the bearer token on a request
async fn authenticate(state: &AppState, req: &HttpRequest) -> Result<Caller, ActionError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    Ok(state.identity.authenticate(authorization).await?)
}

fn parse_course_id(raw: &str) -> Result<Uuid, ActionError> {
    Uuid::parse_str(raw).map_err(|_| ActionError::BadRequest("Invalid course ID".to_string()))
}

/// Serve from cache, or load and populate it
///
/// Cache failures never fail the request.
async fn cached<T, F, Fut>(state: &AppState, key: &str, load: F) -> Result<T, ActionError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ActionError>>,
{
    if let Ok(value) = state.cache.get::<T>(key).await {
        return Ok(value);
    }

    let value = load().await?;
    if let Err(e) = state.cache.set(key, &value).await {
        tracing::warn!("Failed to cache {}: {}", key, e);
    }

    Ok(value)
}

/// Drop cached views after a course or its rounds changed
async fn revalidate(state: &AppState, course_id: Uuid) {
    if let Err(e) = state.cache.invalidate_course(course_id).await {
        tracing::warn!("Failed to invalidate cache for course {}: {}", course_id, e);
    }
}
