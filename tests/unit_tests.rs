// Unit tests for Pace Tracker

use chrono::{NaiveDate, TimeZone, Utc};
use pace_tracker::core::{
    aggregate_rounds, apply_geo_filter, day_name, day_of_week, format_duration,
    haversine_distance, matches_text, minutes_per_hole, parse_tee_time, rate_pace, time_of_day,
    combine_played_at,
};
use pace_tracker::models::{Course, GeoFilter, PaceRating, RoundSample, TimeOfDay};
use uuid::Uuid;

fn create_course(name: &str, lat: f64, lon: f64) -> Course {
    Course {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: None,
        city: None,
        state: Some("CA".to_string()),
        zip_code: None,
        country: Some("US".to_string()),
        latitude: Some(lat),
        longitude: Some(lon),
        number_of_holes: Some(18),
        par: Some(72),
        phone: None,
        website: None,
        verified: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_on(day: u32, minutes: i32) -> RoundSample {
    // June 2024: the 2nd was a Sunday
    let played_at = Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap();
    RoundSample {
        duration_minutes: minutes,
        day_of_week: Some(day_of_week(&played_at)),
        played_at,
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(32.9007, -117.2527, 32.9007, -117.2527);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_in_miles() {
    // New York to Los Angeles is roughly 2445 miles
    let distance = haversine_distance(40.7128, -74.0060, 34.0522, -118.2437);
    assert!((distance - 2445.0).abs() < 25.0, "Expected ~2445mi, got {}", distance);
}

#[test]
fn test_stats_example() {
    // Mon, Sat, Sun, Tue, Wed, Thu
    let rounds = vec![
        sample_on(3, 240),
        sample_on(8, 270),
        sample_on(2, 210),
        sample_on(4, 255),
        sample_on(5, 225),
        sample_on(6, 300),
    ];

    let stats = aggregate_rounds(&rounds).unwrap();
    assert_eq!(stats.total_rounds, 6);
    assert_eq!(stats.average_duration, 250);
    assert_eq!(stats.weekday_average, 255);
    assert_eq!(stats.weekend_average, 240);
    assert_eq!(stats.fastest_round, 210);
    assert_eq!(stats.slowest_round, 300);
}

#[test]
fn test_stats_weekday_only() {
    let stats = aggregate_rounds(&[sample_on(3, 200), sample_on(4, 220)]).unwrap();
    assert_eq!(stats.weekday_average, 210);
    assert_eq!(stats.weekend_average, 0);
}

#[test]
fn test_pace_bands() {
    assert_eq!(rate_pace(216, 18), PaceRating::Fast);
    // 13.0 per hole is the first average value
    assert_eq!(rate_pace(234, 18), PaceRating::Average);
    assert_eq!(rate_pace(269, 18), PaceRating::Average);
    // 15.0 per hole is the first slow value
    assert_eq!(rate_pace(270, 18), PaceRating::Slow);
    assert_eq!(rate_pace(120, 9), PaceRating::Average);
    assert!((minutes_per_hole(117, 9) - 13.0).abs() < f64::EPSILON);
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(255), "4h 15m");
    assert_eq!(format_duration(240), "4h 0m");
    assert_eq!(format_duration(45), "0h 45m");
}

#[test]
fn test_tee_time_derivation() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

    let early = combine_played_at(date, parse_tee_time("6:45").unwrap());
    assert_eq!(day_of_week(&early), 0);
    assert_eq!(day_name(day_of_week(&early)), "Sunday");
    assert_eq!(time_of_day(&early), TimeOfDay::Morning);

    let noon = combine_played_at(date, parse_tee_time("12:00").unwrap());
    assert_eq!(time_of_day(&noon), TimeOfDay::Afternoon);

    let late = combine_played_at(date, parse_tee_time("17:00").unwrap());
    assert_eq!(time_of_day(&late), TimeOfDay::Evening);

    assert!(parse_tee_time("24:00").is_none());
    assert!(parse_tee_time("7:5").is_none());
    assert!(parse_tee_time("noon").is_none());
    assert_eq!(day_name(9), "Unknown");
}

#[test]
fn test_text_matching() {
    assert!(matches_text("Torrey Pines South", "torrey pines"));
    assert!(!matches_text("Torrey Pines South", "torrey -south"));
}

#[test]
fn test_geo_filter_sorts_nearest_first() {
    let center = GeoFilter {
        latitude: 32.9007,
        longitude: -117.2527,
        radius_miles: 30.0,
    };

    let courses = vec![
        create_course("Balboa Park", 32.7300, -117.1400),
        create_course("Pebble Beach", 36.5674, -121.9487),
        create_course("Torrey Pines", 32.9007, -117.2527),
    ];

    let hits = apply_geo_filter(courses, &center);
    let names: Vec<&str> = hits.iter().map(|h| h.course.name.as_str()).collect();

    assert_eq!(names, vec!["Torrey Pines", "Balboa Park"]);
    assert!(hits[1].distance.unwrap() > 10.0 && hits[1].distance.unwrap() < 20.0);
}
