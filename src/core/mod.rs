// Core computation exports
pub mod distance;
pub mod filters;
pub mod pace;
pub mod search;
pub mod stats;
pub mod timing;

pub use distance::haversine_distance;
pub use filters::{matches_city, matches_query, matches_state, matches_text};
pub use pace::{format_duration, minutes_per_hole, rate_pace};
pub use search::{apply_geo_filter, store_order, SearchOutcome, SearchPipeline, SearchPlan};
pub use stats::aggregate_rounds;
pub use timing::{combine_played_at, day_name, day_of_week, parse_tee_time, time_of_day};
