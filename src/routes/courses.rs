use actix_web::{web, HttpRequest, HttpResponse};

use super::{authenticate, cached, parse_course_id, revalidate, AppState};
use crate::error::ActionError;
use crate::models::{
    CreateCourseRequest, CreatedCourse, SearchCoursesRequest, SearchCoursesResponse,
    SuccessResponse,
};
use crate::services::{courses, CacheKey};

/// Configure public course routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/courses", web::get().to(search_courses))
        .route("/courses", web::post().to(create_course))
        .route("/courses/options", web::get().to(list_course_options))
        .route("/courses/{id}", web::get().to(get_course));
}

/// Search verified courses
///
/// GET /api/v1/courses?q=&state=&city=&latitude=&longitude=&distance=&sort=&limit=&offset=
async fn search_courses(
    state: web::Data<AppState>,
    query: web::Query<SearchCoursesRequest>,
) -> Result<HttpResponse, ActionError> {
    let request = query.into_inner();
    let key = CacheKey::search(&request);

    let response = cached(&state, &key, || async {
        let outcome = courses::search_courses(state.store.as_ref(), &state.search, &request).await?;
        Ok::<_, ActionError>(SearchCoursesResponse {
            courses: outcome.courses,
            count: outcome.count,
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::with_data("Courses found", response)))
}

/// Verified courses for the round submission picker
async fn list_course_options(state: web::Data<AppState>) -> Result<HttpResponse, ActionError> {
    let options = cached(&state, &CacheKey::course_options(), || {
        courses::list_course_options(state.store.as_ref())
    })
    .await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::with_data("Course options", options)))
}

/// Course detail with statistics and recent rounds
async fn get_course(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ActionError> {
    let course_id = parse_course_id(&path)?;

    let detail = cached(&state, &CacheKey::course(course_id), || {
        courses::get_course_detail(state.store.as_ref(), course_id)
    })
    .await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::with_data("Course found", detail)))
}

/// Submit a course for review
///
/// POST /api/v1/courses
async fn create_course(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> Result<HttpResponse, ActionError> {
    let caller = authenticate(&state, &http_req).await?;

    let course = courses::create_course(state.store.as_ref(), &caller, body.into_inner()).await?;
    revalidate(&state, course.id).await;

    Ok(HttpResponse::Created().json(SuccessResponse::with_data(
        "Course submitted for review",
        CreatedCourse {
            course_id: course.id,
        },
    )))
}
