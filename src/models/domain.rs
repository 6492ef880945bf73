use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Golf course record as stored
///
/// A course starts out unverified (pending review) and becomes publicly
/// listed once an administrator flips `verified`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub number_of_holes: Option<i32>,
    pub par: Option<i32>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Coordinates as a pair, only when both are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Validated course submission ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub number_of_holes: i32,
    pub par: Option<i32>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

/// Minimal course listing used to pick a course when submitting a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseOption {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Search result entry, annotated with a distance when a radius search ran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseHit {
    #[serde(flatten)]
    pub course: Course,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl From<Course> for CourseHit {
    fn from(course: Course) -> Self {
        Self { course, distance: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "travel_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walk,
    Cart,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "weather_condition", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Windy,
    Hot,
    Cold,
}

/// Coarse tee-time bucket derived from the hour a round started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "time_of_day", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

/// One user-reported round
///
/// `day_of_week` and `time_of_day` are derived from `played_at` when the
/// round is built and never set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoundSubmission {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_id: String,
    pub played_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub number_of_players: i32,
    pub holes_played: i32,
    pub day_of_week: i32,
    pub time_of_day: TimeOfDay,
    pub walk_or_cart: TravelMode,
    pub weather_conditions: Option<Weather>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Round ready for insertion, derived fields already filled in
#[derive(Debug, Clone, PartialEq)]
pub struct NewRound {
    pub course_id: Uuid,
    pub user_id: String,
    pub played_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub number_of_players: i32,
    pub holes_played: i32,
    pub day_of_week: i32,
    pub time_of_day: TimeOfDay,
    pub walk_or_cart: TravelMode,
    pub weather_conditions: Option<Weather>,
    pub notes: Option<String>,
}

/// The slice of a round the statistics aggregator needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoundSample {
    pub duration_minutes: i32,
    pub day_of_week: Option<i32>,
    pub played_at: DateTime<Utc>,
}

impl From<&RoundSubmission> for RoundSample {
    fn from(round: &RoundSubmission) -> Self {
        Self {
            duration_minutes: round.duration_minutes,
            day_of_week: Some(round.day_of_week),
            played_at: round.played_at,
        }
    }
}

/// Per-course pace-of-play summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseStats {
    pub total_rounds: usize,
    pub average_duration: i32,
    pub weekday_average: i32,
    pub weekend_average: i32,
    pub fastest_round: i32,
    pub slowest_round: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceRating {
    Fast,
    Average,
    Slow,
}

/// Recent round as shown on a course page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentRound {
    pub id: Uuid,
    pub duration_minutes: i32,
    pub holes_played: i32,
    pub number_of_players: i32,
    pub played_at: DateTime<Utc>,
    pub walk_or_cart: TravelMode,
    pub pace: PaceRating,
}

/// Authenticated identity making a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub is_admin: bool,
}

/// Ordering requested for a course search
///
/// Unrecognized values deserialize to `Name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortKey {
    #[default]
    Fastest,
    Slowest,
    Distance,
    Popular,
    Name,
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "fastest" => SortKey::Fastest,
            "slowest" => SortKey::Slowest,
            "distance" => SortKey::Distance,
            "popular" => SortKey::Popular,
            _ => SortKey::Name,
        }
    }
}

/// Order the data store applies before any geographic post-processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreOrder {
    NameAsc,
    CreatedDesc,
}

/// Store-level part of a course search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseQuery {
    pub text: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub verified_only: bool,
    pub order: StoreOrder,
    /// `None` returns every match
    pub limit: Option<usize>,
    pub offset: usize,
}

/// Geographic radius filter, only active when all three values are present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFilter {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_miles: f64,
}

/// One page of store results plus the total count for the store filters
#[derive(Debug, Clone, PartialEq)]
pub struct CoursePage {
    pub courses: Vec<Course>,
    pub total: i64,
}
