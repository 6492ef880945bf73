use crate::core::timing::day_of_week;
use crate::models::{CourseStats, RoundSample};

/// Summarize the rounds reported for one course
///
/// Returns `None` for an empty slice so "no data yet" never shows up as a
/// row of zeros. Weekday means Monday through Friday (1-5), weekend means
/// Sunday and Saturday (0, 6); a split with no rounds averages to 0.
pub fn aggregate_rounds(rounds: &[RoundSample]) -> Option<CourseStats> {
    if rounds.is_empty() {
        return None;
    }

    let mut total: i64 = 0;
    let mut weekday = Tally::default();
    let mut weekend = Tally::default();
    let mut fastest = i32::MAX;
    let mut slowest = i32::MIN;

    for round in rounds {
        let minutes = round.duration_minutes;
        total += i64::from(minutes);
        fastest = fastest.min(minutes);
        slowest = slowest.max(minutes);

        // Rows written before derivation existed may lack a day
        let day = round
            .day_of_week
            .unwrap_or_else(|| day_of_week(&round.played_at));

        match day {
            1..=5 => weekday.add(minutes),
            0 | 6 => weekend.add(minutes),
            _ => {}
        }
    }

    Some(CourseStats {
        total_rounds: rounds.len(),
        average_duration: rounded_mean(total, rounds.len()),
        weekday_average: weekday.mean(),
        weekend_average: weekend.mean(),
        fastest_round: fastest,
        slowest_round: slowest,
    })
}

#[derive(Debug, Default)]
struct Tally {
    sum: i64,
    count: usize,
}

impl Tally {
    fn add(&mut self, minutes: i32) {
        self.sum += i64::from(minutes);
        self.count += 1;
    }

    fn mean(&self) -> i32 {
        if self.count == 0 {
            0
        } else {
            rounded_mean(self.sum, self.count)
        }
    }
}

#[inline]
fn rounded_mean(sum: i64, count: usize) -> i32 {
    (sum as f64 / count as f64).round() as i32
}
