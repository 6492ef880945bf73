use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Course, CourseOption, CoursePage, CourseQuery, NewCourse, NewRound, RoundSample,
    RoundSubmission,
};

/// Errors that can occur when talking to the course data store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Persistence boundary for courses and round submissions
///
/// Each method is a single store round-trip; nothing here spans a
/// transaction. Deleting a course removes its rounds as well.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Insert an unverified course and return the stored row
    async fn insert_course(&self, course: &NewCourse) -> Result<Course, StoreError>;

    /// Id of a course with the same name, city and state, if any
    async fn find_duplicate(
        &self,
        name: &str,
        city: &str,
        state: &str,
    ) -> Result<Option<Uuid>, StoreError>;

    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, StoreError>;

    /// Overwrite the editable fields of a course; false if it no longer exists
    async fn save_course(&self, course: &Course) -> Result<bool, StoreError>;

    /// Mark a course verified; false if it does not exist
    async fn approve_course(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Delete a course and its rounds; false if it does not exist
    async fn delete_course(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Unverified courses, newest first
    async fn list_unverified(&self) -> Result<Vec<Course>, StoreError>;

    /// Verified courses ordered by name
    async fn list_course_options(&self) -> Result<Vec<CourseOption>, StoreError>;

    /// One page of courses plus the total matching the query's filters
    async fn search_courses(&self, query: &CourseQuery) -> Result<CoursePage, StoreError>;

    async fn insert_round(&self, round: &NewRound) -> Result<RoundSubmission, StoreError>;

    /// Every round of a course, reduced to what the aggregator reads
    async fn round_samples(&self, course_id: Uuid) -> Result<Vec<RoundSample>, StoreError>;

    /// Latest rounds of a course by `played_at`, newest first
    async fn recent_rounds(
        &self,
        course_id: Uuid,
        limit: usize,
    ) -> Result<Vec<RoundSubmission>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
