use std::cmp::Ordering;

use crate::core::distance::haversine_distance;
use crate::models::{
    Course, CourseHit, CoursePage, CourseQuery, GeoFilter, SearchCoursesRequest, SortKey,
    StoreOrder,
};
use crate::services::{CourseStore, StoreError};

/// Result of a course search
///
/// `count` is the number of courses matching the store-level filters (text,
/// state, city) and is taken before the radius filter narrows the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub courses: Vec<CourseHit>,
    pub count: i64,
}

/// A search split into the part the store runs and the part run in memory
///
/// With a radius filter the store returns every match and paging happens
/// after the distance sort.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub query: CourseQuery,
    pub geo: Option<GeoFilter>,
    pub limit: usize,
    pub offset: usize,
}

/// Largest offset any store can bind
const MAX_OFFSET: usize = i64::MAX as usize;

/// Course search orchestrator
///
/// # Pipeline Stages
/// 1. Store query: verified courses, full-text name match, state, city, order
/// 2. Radius filter: drop courses without coordinates or beyond the radius
/// 3. Distance sort, which overrides the requested order when stage 2 ran
/// 4. Paging, done by the store unless stage 2 ran
#[derive(Debug, Clone, Copy)]
pub struct SearchPipeline {
    default_limit: usize,
    max_limit: usize,
}

impl SearchPipeline {
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        Self {
            default_limit,
            max_limit: max_limit.max(1),
        }
    }

    /// Turn request filters into a store query plus an optional radius filter
    pub fn plan(&self, request: &SearchCoursesRequest) -> SearchPlan {
        let limit = request
            .limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit);
        let offset = request.offset.unwrap_or(0).min(MAX_OFFSET);

        // Partial geo input is ignored rather than rejected
        let geo = match (request.latitude, request.longitude, request.distance) {
            (Some(latitude), Some(longitude), Some(radius_miles)) => Some(GeoFilter {
                latitude,
                longitude,
                radius_miles,
            }),
            _ => None,
        };

        let (store_limit, store_offset) = match geo {
            Some(_) => (None, 0),
            None => (Some(limit), offset),
        };

        let query = CourseQuery {
            text: non_blank(request.q.as_deref()),
            state: non_blank(request.state.as_deref()),
            city: non_blank(request.city.as_deref()),
            verified_only: true,
            order: store_order(request.sort.unwrap_or_default()),
            limit: store_limit,
            offset: store_offset,
        };

        SearchPlan {
            query,
            geo,
            limit,
            offset,
        }
    }

    /// Apply the in-memory stages to what the store returned
    pub fn finish(&self, plan: &SearchPlan, page: CoursePage) -> SearchOutcome {
        let courses = match plan.geo {
            Some(ref geo) => apply_geo_filter(page.courses, geo)
                .into_iter()
                .skip(plan.offset)
                .take(plan.limit)
                .collect(),
            None => page.courses.into_iter().map(CourseHit::from).collect(),
        };

        SearchOutcome {
            courses,
            count: page.total,
        }
    }

    /// Run the full pipeline against a store
    pub async fn run(
        &self,
        store: &dyn CourseStore,
        request: &SearchCoursesRequest,
    ) -> Result<SearchOutcome, StoreError> {
        let plan = self.plan(request);
        let page = store.search_courses(&plan.query).await?;
        let outcome = self.finish(&plan, page);

        tracing::debug!(
            "Course search returned {} of {} courses (geo: {})",
            outcome.courses.len(),
            outcome.count,
            plan.geo.is_some()
        );

        Ok(outcome)
    }
}

/// Store ordering for a requested sort key
///
/// Only name and recency are backed by the store; pace-based keys and
/// `distance` without a radius search fall back to name.
pub fn store_order(sort: SortKey) -> StoreOrder {
    match sort {
        SortKey::Popular => StoreOrder::CreatedDesc,
        SortKey::Name | SortKey::Fastest | SortKey::Slowest | SortKey::Distance => {
            StoreOrder::NameAsc
        }
    }
}

/// Attach distances, drop courses outside the radius, sort nearest first
pub fn apply_geo_filter(courses: Vec<Course>, geo: &GeoFilter) -> Vec<CourseHit> {
    let mut hits: Vec<CourseHit> = courses
        .into_iter()
        .filter_map(|course| {
            let (lat, lon) = course.coordinates()?;
            let distance = haversine_distance(geo.latitude, geo.longitude, lat, lon);

            if distance <= geo.radius_miles {
                Some(CourseHit {
                    course,
                    distance: Some(distance),
                })
            } else {
                None
            }
        })
        .collect();

    // Stable, so equidistant courses keep the store order
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
    });

    hits
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Default for SearchPipeline {
    fn default() -> Self {
        Self::new(50, 100)
    }
}
