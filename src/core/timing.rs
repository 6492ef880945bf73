use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::models::TimeOfDay;

/// Day of week with Sunday as 0 and Saturday as 6
#[inline]
pub fn day_of_week(played_at: &DateTime<Utc>) -> i32 {
    played_at.weekday().num_days_from_sunday() as i32
}

/// Bucket a tee time: before noon is morning, before 17:00 afternoon
pub fn time_of_day(played_at: &DateTime<Utc>) -> TimeOfDay {
    match played_at.hour() {
        0..=11 => TimeOfDay::Morning,
        12..=16 => TimeOfDay::Afternoon,
        _ => TimeOfDay::Evening,
    }
}

/// Parse a `H:MM` / `HH:MM` tee time (hours 0-23, minutes 00-59)
pub fn parse_tee_time(value: &str) -> Option<NaiveTime> {
    let (hours, minutes) = value.split_once(':')?;

    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;

    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Combine the submitted date and tee time into one UTC timestamp
pub fn combine_played_at(date: NaiveDate, tee_time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(tee_time))
}

/// Weekday name for a 0-6 day index
pub fn day_name(day_of_week: i32) -> &'static str {
    match day_of_week {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_week() {
        // 2024-06-01 was a Saturday
        let saturday = Utc.with_ymd_and_hms(2024, 6, 1, 7, 30, 0).unwrap();
        assert_eq!(day_of_week(&saturday), 6);

        let sunday = Utc.with_ymd_and_hms(2024, 6, 2, 7, 30, 0).unwrap();
        assert_eq!(day_of_week(&sunday), 0);
    }

    #[test]
    fn test_time_of_day_boundaries() {
        let at = |h| Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap();

        assert_eq!(time_of_day(&at(0)), TimeOfDay::Morning);
        assert_eq!(time_of_day(&at(11)), TimeOfDay::Morning);
        assert_eq!(time_of_day(&at(12)), TimeOfDay::Afternoon);
        assert_eq!(time_of_day(&at(16)), TimeOfDay::Afternoon);
        assert_eq!(time_of_day(&at(17)), TimeOfDay::Evening);
        assert_eq!(time_of_day(&at(23)), TimeOfDay::Evening);
    }

    #[test]
    fn test_parse_tee_time() {
        assert_eq!(parse_tee_time("7:05"), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_tee_time("07:05"), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_tee_time("23:59"), NaiveTime::from_hms_opt(23, 59, 0));

        assert!(parse_tee_time("24:00").is_none());
        assert!(parse_tee_time("12:60").is_none());
        assert!(parse_tee_time("12:5").is_none());
        assert!(parse_tee_time("123:00").is_none());
        assert!(parse_tee_time("+1:00").is_none());
        assert!(parse_tee_time("noon").is_none());
    }

    #[test]
    fn test_combine_played_at() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let time = NaiveTime::from_hms_opt(14, 10, 0).unwrap();
        let played_at = combine_played_at(date, time);

        assert_eq!(played_at, Utc.with_ymd_and_hms(2024, 6, 1, 14, 10, 0).unwrap());
        assert_eq!(time_of_day(&played_at), TimeOfDay::Afternoon);
    }

    #[test]
    fn test_day_name() {
        assert_eq!(day_name(0), "Sunday");
        assert_eq!(day_name(6), "Saturday");
        assert_eq!(day_name(9), "Unknown");
    }
}
