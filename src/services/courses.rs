use uuid::Uuid;

use crate::core::{aggregate_rounds, rate_pace, SearchOutcome, SearchPipeline};
use crate::error::ActionError;
use crate::models::{
    Caller, Course, CourseDetailResponse, CourseOption, CreateCourseRequest, RecentRound,
    SearchCoursesRequest, UpdateCourseRequest,
};
use crate::services::store::CourseStore;

/// Number of rounds shown on a course page
pub const RECENT_ROUNDS: usize = 5;

const COURSE_NOT_FOUND: &str = "Course not found";

fn require_admin(caller: &Caller) -> Result<(), ActionError> {
    if caller.is_admin {
        Ok(())
    } else {
        tracing::warn!("User {} attempted an admin action", caller.user_id);
        Err(ActionError::Forbidden)
    }
}

/// Submit a new course for review
pub async fn create_course(
    store: &dyn CourseStore,
    caller: &Caller,
    request: CreateCourseRequest,
) -> Result<Course, ActionError> {
    let course = request.prepare()?;

    if store
        .find_duplicate(&course.name, &course.city, &course.state)
        .await?
        .is_some()
    {
        return Err(ActionError::Conflict(
            "A course with this name already exists in this location".to_string(),
        ));
    }

    let created = store.insert_course(&course).await?;
    tracing::info!(
        "User {} submitted course {} ({})",
        caller.user_id,
        created.id,
        created.name
    );

    Ok(created)
}

/// Edit a course's fields
pub async fn update_course(
    store: &dyn CourseStore,
    caller: &Caller,
    course_id: Uuid,
    request: UpdateCourseRequest,
) -> Result<Course, ActionError> {
    require_admin(caller)?;
    let request = request.prepare()?;

    let mut course = store
        .get_course(course_id)
        .await?
        .ok_or_else(|| ActionError::NotFound(COURSE_NOT_FOUND.to_string()))?;

    request.apply_to(&mut course);

    if !store.save_course(&course).await? {
        return Err(ActionError::NotFound(COURSE_NOT_FOUND.to_string()));
    }

    tracing::info!("Admin {} updated course {}", caller.user_id, course_id);
    Ok(course)
}

/// Mark a pending course as verified
pub async fn approve_course(
    store: &dyn CourseStore,
    caller: &Caller,
    course_id: Uuid,
) -> Result<(), ActionError> {
    require_admin(caller)?;

    let course = store
        .get_course(course_id)
        .await?
        .ok_or_else(|| ActionError::NotFound(COURSE_NOT_FOUND.to_string()))?;

    if course.verified {
        return Err(ActionError::Conflict("Course is already verified".to_string()));
    }

    if !store.approve_course(course_id).await? {
        return Err(ActionError::NotFound(COURSE_NOT_FOUND.to_string()));
    }

    tracing::info!("Admin {} approved course {}", caller.user_id, course_id);
    Ok(())
}

/// Remove a course and every round reported for it
pub async fn delete_course(
    store: &dyn CourseStore,
    caller: &Caller,
    course_id: Uuid,
) -> Result<(), ActionError> {
    require_admin(caller)?;

    if !store.delete_course(course_id).await? {
        return Err(ActionError::NotFound(COURSE_NOT_FOUND.to_string()));
    }

    tracing::info!("Admin {} deleted course {}", caller.user_id, course_id);
    Ok(())
}

pub async fn list_pending_courses(
    store: &dyn CourseStore,
    caller: &Caller,
) -> Result<Vec<Course>, ActionError> {
    require_admin(caller)?;
    Ok(store.list_unverified().await?)
}

pub async fn list_course_options(store: &dyn CourseStore) -> Result<Vec<CourseOption>, ActionError> {
    Ok(store.list_course_options().await?)
}

/// Course page: record, statistics and the latest rounds with their pace
pub async fn get_course_detail(
    store: &dyn CourseStore,
    course_id: Uuid,
) -> Result<CourseDetailResponse, ActionError> {
    let course = store
        .get_course(course_id)
        .await?
        .ok_or_else(|| ActionError::NotFound(COURSE_NOT_FOUND.to_string()))?;

    let samples = store.round_samples(course_id).await?;
    let stats = aggregate_rounds(&samples);

    let recent_rounds = store
        .recent_rounds(course_id, RECENT_ROUNDS)
        .await?
        .into_iter()
        .map(|round| RecentRound {
            id: round.id,
            pace: rate_pace(round.duration_minutes, round.holes_played),
            duration_minutes: round.duration_minutes,
            holes_played: round.holes_played,
            number_of_players: round.number_of_players,
            played_at: round.played_at,
            walk_or_cart: round.walk_or_cart,
        })
        .collect();

    Ok(CourseDetailResponse {
        course,
        stats,
        recent_rounds,
    })
}

/// Public course search over verified courses
pub async fn search_courses(
    store: &dyn CourseStore,
    pipeline: &SearchPipeline,
    request: &SearchCoursesRequest,
) -> Result<SearchOutcome, ActionError> {
    request.check()?;
    Ok(pipeline.run(store, request).await?)
}
