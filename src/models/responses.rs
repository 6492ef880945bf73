use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{Course, CourseHit, CourseStats, RecentRound};

/// Tagged success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl SuccessResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Field-level validation problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Tagged failure envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldIssue>>,
}

/// Response for the course search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCoursesResponse {
    pub courses: Vec<CourseHit>,
    pub count: i64,
}

/// Course page payload: the record, its statistics and latest rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: Course,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CourseStats>,
    pub recent_rounds: Vec<RecentRound>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedCourse {
    pub course_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRound {
    pub round_id: Uuid,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
