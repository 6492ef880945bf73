//! Pace Tracker - golf course directory and pace-of-play service
//!
//! Courses are submitted by users, reviewed by administrators, and collect
//! round reports from which per-course pace statistics are computed.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{aggregate_rounds, haversine_distance, rate_pace, SearchPipeline};
pub use error::ActionError;
pub use models::{Caller, Course, CourseStats, PaceRating, RoundSubmission};
pub use services::{CourseStore, MemoryStore, PostgresClient};
