use crate::models::PaceRating;

/// Upper bound (exclusive) of the "fast" band, in minutes per hole
pub const FAST_BELOW: f64 = 13.0;
/// Upper bound (exclusive) of the "average" band, in minutes per hole
pub const AVERAGE_BELOW: f64 = 15.0;

/// Minutes spent per hole; `holes_played` must be positive
#[inline]
pub fn minutes_per_hole(duration_minutes: i32, holes_played: i32) -> f64 {
    debug_assert!(holes_played > 0, "holes_played must be positive");
    f64::from(duration_minutes) / f64::from(holes_played)
}

/// Classify a round as fast, average or slow
///
/// Bands are half-open: `[0, 13)` fast, `[13, 15)` average, `[15, ..)` slow.
pub fn rate_pace(duration_minutes: i32, holes_played: i32) -> PaceRating {
    let per_hole = minutes_per_hole(duration_minutes, holes_played);

    if per_hole < FAST_BELOW {
        PaceRating::Fast
    } else if per_hole < AVERAGE_BELOW {
        PaceRating::Average
    } else {
        PaceRating::Slow
    }
}

/// Render minutes as `"{h}h {m}m"`
pub fn format_duration(minutes: i32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}
