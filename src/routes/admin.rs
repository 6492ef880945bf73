use actix_web::{web, HttpRequest, HttpResponse};

use super::{authenticate, parse_course_id, revalidate, AppState};
use crate::error::ActionError;
use crate::models::{SuccessResponse, UpdateCourseRequest};
use crate::services::courses;

/// Configure administrator routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/courses")
            .route("/pending", web::get().to(list_pending))
            .route("/{id}", web::patch().to(update_course))
            .route("/{id}", web::delete().to(delete_course))
            .route("/{id}/approve", web::post().to(approve_course)),
    );
}

async fn list_pending(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ActionError> {
    let caller = authenticate(&state, &http_req).await?;

    let pending = courses::list_pending_courses(state.store.as_ref(), &caller).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::with_data("Pending courses", pending)))
}

async fn update_course(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateCourseRequest>,
) -> Result<HttpResponse, ActionError> {
    let caller = authenticate(&state, &http_req).await?;
    let course_id = parse_course_id(&path)?;

    let course =
        courses::update_course(state.store.as_ref(), &caller, course_id, body.into_inner())
            .await?;
    revalidate(&state, course_id).await;

    Ok(HttpResponse::Ok().json(SuccessResponse::with_data("Course updated successfully", course)))
}

async fn approve_course(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ActionError> {
    let caller = authenticate(&state, &http_req).await?;
    let course_id = parse_course_id(&path)?;

    courses::approve_course(state.store.as_ref(), &caller, course_id).await?;
    revalidate(&state, course_id).await;

    Ok(HttpResponse::Ok().json(SuccessResponse::message("Course approved successfully")))
}

async fn delete_course(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ActionError> {
    let caller = authenticate(&state, &http_req).await?;
    let course_id = parse_course_id(&path)?;

    courses::delete_course(state.store.as_ref(), &caller, course_id).await?;
    revalidate(&state, course_id).await;

    Ok(HttpResponse::Ok().json(SuccessResponse::message("Course deleted successfully")))
}
