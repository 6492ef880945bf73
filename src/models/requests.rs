use std::borrow::Cow;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::core::timing::{combine_played_at, day_of_week, parse_tee_time, time_of_day};
use crate::models::domain::{Course, NewCourse, NewRound, SortKey, TravelMode, Weather};

/// Two-letter codes accepted for `state`
pub const US_STATES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

/// Country codes accepted for `country`
pub const COUNTRIES: [&str; 3] = ["US", "CA", "MX"];

/// Hole counts a course can have
pub const COURSE_HOLES: [i32; 3] = [9, 18, 27];

/// Hole counts a round can cover
pub const ROUND_HOLES: [i32; 2] = [9, 18];

/// Course search filters, read from the query string
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct SearchCoursesRequest {
    pub q: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    /// Radius in miles
    pub distance: Option<f64>,
    pub sort: Option<SortKey>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl SearchCoursesRequest {
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = base_errors(self.validate());

        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
            if !US_STATES.contains(&state) {
                errors.add("state", issue("state", "Invalid state"));
            }
        }
        if let Some(distance) = self.distance {
            if !(distance.is_finite() && distance > 0.0) {
                errors.add("distance", issue("positive", "Distance must be positive"));
            }
        }

        finish(errors)
    }
}

/// Course submission from a signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(
        min = 2,
        max = 200,
        message = "Course name must be between 2 and 200 characters"
    ))]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub zip_code: Option<String>,
    pub country: String,
    pub number_of_holes: i32,
    #[validate(range(min = 27, max = 90, message = "Par must be between 27 and 90"))]
    pub par: Option<i32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl CreateCourseRequest {
    /// Validate and normalize into an insertable course
    ///
    /// Name and city are trimmed before their lengths are checked.
    pub fn prepare(mut self) -> Result<NewCourse, ValidationErrors> {
        self.name = self.name.trim().to_string();
        self.city = self.city.trim().to_string();
        let mut errors = base_errors(self.validate());

        check_state(&mut errors, &self.state);
        check_country(&mut errors, &self.country);
        check_course_holes(&mut errors, self.number_of_holes);
        check_coordinate_pair(&mut errors, self.latitude, self.longitude);
        finish(errors)?;

        Ok(NewCourse {
            name: self.name,
            address: blank_to_none(self.address),
            city: self.city,
            state: self.state,
            zip_code: blank_to_none(self.zip_code),
            country: self.country,
            latitude: self.latitude,
            longitude: self.longitude,
            number_of_holes: self.number_of_holes,
            par: self.par,
            phone: blank_to_none(self.phone),
            website: blank_to_none(self.website),
        })
    }
}

/// Partial course edit made by an administrator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(
        min = 2,
        max = 200,
        message = "Course name must be between 2 and 200 characters"
    ))]
    pub name: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub number_of_holes: Option<i32>,
    #[validate(range(min = 27, max = 90, message = "Par must be between 27 and 90"))]
    pub par: Option<i32>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl UpdateCourseRequest {
    /// Trim name and city, then validate the fields that are present
    pub fn prepare(mut self) -> Result<Self, ValidationErrors> {
        self.name = self.name.map(|name| name.trim().to_string());
        self.city = self.city.map(|city| city.trim().to_string());
        self.check()?;
        Ok(self)
    }

    fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = base_errors(self.validate());

        if let Some(state) = self.state.as_deref() {
            check_state(&mut errors, state);
        }
        if let Some(country) = self.country.as_deref() {
            check_country(&mut errors, country);
        }
        if let Some(holes) = self.number_of_holes {
            check_course_holes(&mut errors, holes);
        }
        check_coordinate_pair(&mut errors, self.latitude, self.longitude);

        finish(errors)
    }

    /// Apply the present fields to a stored course and bump `updated_at`
    pub fn apply_to(self, course: &mut Course) {
        if let Some(name) = self.name {
            course.name = name;
        }
        if let Some(address) = self.address {
            course.address = blank_to_none(Some(address));
        }
        if let Some(city) = self.city {
            course.city = Some(city);
        }
        if let Some(state) = self.state {
            course.state = Some(state);
        }
        if let Some(zip_code) = self.zip_code {
            course.zip_code = blank_to_none(Some(zip_code));
        }
        if let Some(country) = self.country {
            course.country = Some(country);
        }
        if let Some(holes) = self.number_of_holes {
            course.number_of_holes = Some(holes);
        }
        if let Some(par) = self.par {
            course.par = Some(par);
        }
        if let Some(phone) = self.phone {
            course.phone = blank_to_none(Some(phone));
        }
        if let Some(website) = self.website {
            course.website = blank_to_none(Some(website));
        }
        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            course.latitude = Some(lat);
            course.longitude = Some(lon);
        }
        course.updated_at = Utc::now();
    }
}

/// Round report from a signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateRoundRequest {
    pub course_id: Uuid,
    pub played_date: NaiveDate,
    pub tee_time: String,
    #[validate(range(
        min = 30,
        max = 600,
        message = "Duration must be between 30 minutes and 10 hours"
    ))]
    pub duration_minutes: i32,
    #[validate(range(min = 1, max = 6, message = "Between 1 and 6 players allowed"))]
    pub number_of_players: i32,
    pub holes_played: i32,
    pub walk_or_cart: TravelMode,
    #[serde(default)]
    pub weather_conditions: Option<Weather>,
    #[validate(length(max = 500, message = "Notes must be less than 500 characters"))]
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateRoundRequest {
    /// Validate, then build the round with its derived day and time bucket
    pub fn prepare(self, user_id: &str) -> Result<NewRound, ValidationErrors> {
        let mut errors = base_errors(self.validate());

        let played_at = match parse_tee_time(&self.tee_time) {
            Some(tee_time) => Some(combine_played_at(self.played_date, tee_time)),
            None => {
                errors.add(
                    "tee_time",
                    issue("tee_time", "Please enter a valid time (HH:MM format)"),
                );
                None
            }
        };
        if !ROUND_HOLES.contains(&self.holes_played) {
            errors.add("holes_played", issue("holes", "Holes played must be 9 or 18"));
        }

        let played_at = match played_at {
            Some(played_at) if errors.errors().is_empty() => played_at,
            _ => return Err(errors),
        };

        Ok(NewRound {
            course_id: self.course_id,
            user_id: user_id.to_string(),
            played_at,
            duration_minutes: self.duration_minutes,
            number_of_players: self.number_of_players,
            holes_played: self.holes_played,
            day_of_week: day_of_week(&played_at),
            time_of_day: time_of_day(&played_at),
            walk_or_cart: self.walk_or_cart,
            weather_conditions: self.weather_conditions,
            notes: blank_to_none(self.notes),
        })
    }
}

fn check_state(errors: &mut ValidationErrors, state: &str) {
    if !US_STATES.contains(&state) {
        errors.add("state", issue("state", "Invalid state"));
    }
}

fn check_country(errors: &mut ValidationErrors, country: &str) {
    if !COUNTRIES.contains(&country) {
        errors.add("country", issue("country", "Country must be one of US, CA, MX"));
    }
}

fn check_course_holes(errors: &mut ValidationErrors, holes: i32) {
    if !COURSE_HOLES.contains(&holes) {
        errors.add(
            "number_of_holes",
            issue("holes", "Number of holes must be 9, 18 or 27"),
        );
    }
}

fn check_coordinate_pair(errors: &mut ValidationErrors, lat: Option<f64>, lon: Option<f64>) {
    if lat.is_some() != lon.is_some() {
        errors.add(
            "latitude",
            issue("coordinates", "Latitude and longitude must be supplied together"),
        );
    }
}

fn issue(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn base_errors(result: Result<(), ValidationErrors>) -> ValidationErrors {
    match result {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    }
}

fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
