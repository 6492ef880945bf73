use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::filters::matches_query;
use crate::models::{
    Course, CourseOption, CoursePage, CourseQuery, NewCourse, NewRound, RoundSample,
    RoundSubmission, StoreOrder,
};
use crate::services::store::{CourseStore, StoreError};

#[derive(Default)]
struct MemoryState {
    courses: HashMap<Uuid, Course>,
    rounds: Vec<RoundSubmission>,
}

/// In-process course store
///
/// Mirrors the PostgreSQL store closely enough to run the full request path
/// in tests and local development without a database. Text search is
/// word-based rather than stemmed.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn insert_course(&self, course: &NewCourse) -> Result<Course, StoreError> {
        let now = Utc::now();
        let row = Course {
            id: Uuid::new_v4(),
            name: course.name.clone(),
            address: course.address.clone(),
            city: Some(course.city.clone()),
            state: Some(course.state.clone()),
            zip_code: course.zip_code.clone(),
            country: Some(course.country.clone()),
            latitude: course.latitude,
            longitude: course.longitude,
            number_of_holes: Some(course.number_of_holes),
            par: course.par,
            phone: course.phone.clone(),
            website: course.website.clone(),
            verified: false,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        state.courses.insert(row.id, row.clone());

        Ok(row)
    }

    async fn find_duplicate(
        &self,
        name: &str,
        city: &str,
        state: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        let guard = self.state.read().await;
        let id = guard
            .courses
            .values()
            .find(|c| {
                c.name == name
                    && c.city.as_deref() == Some(city)
                    && c.state.as_deref() == Some(state)
            })
            .map(|c| c.id);

        Ok(id)
    }

    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        let state = self.state.read().await;
        Ok(state.courses.get(&id).cloned())
    }

    async fn save_course(&self, course: &Course) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.courses.get_mut(&course.id) {
            Some(existing) => {
                // verified and created_at are not editable through this path
                let verified = existing.verified;
                let created_at = existing.created_at;
                *existing = course.clone();
                existing.verified = verified;
                existing.created_at = created_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn approve_course(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.courses.get_mut(&id) {
            Some(course) => {
                course.verified = true;
                course.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.courses.remove(&id).is_none() {
            return Ok(false);
        }
        state.rounds.retain(|r| r.course_id != id);
        Ok(true)
    }

    async fn list_unverified(&self) -> Result<Vec<Course>, StoreError> {
        let state = self.state.read().await;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|c| !c.verified)
            .cloned()
            .collect();
        sort_courses(&mut courses, StoreOrder::CreatedDesc);

        Ok(courses)
    }

    async fn list_course_options(&self) -> Result<Vec<CourseOption>, StoreError> {
        let state = self.state.read().await;
        let mut courses: Vec<&Course> = state.courses.values().filter(|c| c.verified).collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(courses
            .into_iter()
            .map(|c| CourseOption {
                id: c.id,
                name: c.name.clone(),
                city: c.city.clone(),
                state: c.state.clone(),
            })
            .collect())
    }

    async fn search_courses(&self, query: &CourseQuery) -> Result<CoursePage, StoreError> {
        let state = self.state.read().await;
        let mut matching: Vec<Course> = state
            .courses
            .values()
            .filter(|c| matches_query(c, query))
            .cloned()
            .collect();

        let total = matching.len() as i64;
        sort_courses(&mut matching, query.order);

        let courses = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(CoursePage { courses, total })
    }

    async fn insert_round(&self, round: &NewRound) -> Result<RoundSubmission, StoreError> {
        let mut state = self.state.write().await;
        if !state.courses.contains_key(&round.course_id) {
            return Err(StoreError::NotFound(format!("course {}", round.course_id)));
        }

        let row = RoundSubmission {
            id: Uuid::new_v4(),
            course_id: round.course_id,
            user_id: round.user_id.clone(),
            played_at: round.played_at,
            duration_minutes: round.duration_minutes,
            number_of_players: round.number_of_players,
            holes_played: round.holes_played,
            day_of_week: round.day_of_week,
            time_of_day: round.time_of_day,
            walk_or_cart: round.walk_or_cart,
            weather_conditions: round.weather_conditions,
            notes: round.notes.clone(),
            created_at: Utc::now(),
        };
        state.rounds.push(row.clone());

        Ok(row)
    }

    async fn round_samples(&self, course_id: Uuid) -> Result<Vec<RoundSample>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .rounds
            .iter()
            .filter(|r| r.course_id == course_id)
            .map(RoundSample::from)
            .collect())
    }

    async fn recent_rounds(
        &self,
        course_id: Uuid,
        limit: usize,
    ) -> Result<Vec<RoundSubmission>, StoreError> {
        let state = self.state.read().await;
        let mut rounds: Vec<RoundSubmission> = state
            .rounds
            .iter()
            .filter(|r| r.course_id == course_id)
            .cloned()
            .collect();
        rounds.sort_by(|a, b| b.played_at.cmp(&a.played_at));
        rounds.truncate(limit);

        Ok(rounds)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

fn sort_courses(courses: &mut [Course], order: StoreOrder) {
    match order {
        StoreOrder::NameAsc => courses.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
        StoreOrder::CreatedDesc => courses.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(a.id.cmp(&b.id))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeOfDay, TravelMode};
    use chrono::{Duration, TimeZone};

    fn new_course(name: &str, city: &str) -> NewCourse {
        NewCourse {
            name: name.to_string(),
            address: None,
            city: city.to_string(),
            state: "CA".to_string(),
            zip_code: None,
            country: "US".to_string(),
            latitude: None,
            longitude: None,
            number_of_holes: 18,
            par: Some(72),
            phone: None,
            website: None,
        }
    }

    fn new_round(course_id: Uuid, days_ago: i64) -> NewRound {
        let played_at = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap() - Duration::days(days_ago);
        NewRound {
            course_id,
            user_id: "user_1".to_string(),
            played_at,
            duration_minutes: 240,
            number_of_players: 4,
            holes_played: 18,
            day_of_week: 6,
            time_of_day: TimeOfDay::Morning,
            walk_or_cart: TravelMode::Walk,
            weather_conditions: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_delete_cascades_rounds() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course("Lincoln Park", "San Francisco")).await.unwrap();
        store.insert_round(&new_round(course.id, 0)).await.unwrap();
        store.insert_round(&new_round(course.id, 1)).await.unwrap();

        assert_eq!(store.round_samples(course.id).await.unwrap().len(), 2);
        assert!(store.delete_course(course.id).await.unwrap());
        assert!(store.round_samples(course.id).await.unwrap().is_empty());
        assert!(!store.delete_course(course.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_round_requires_course() {
        let store = MemoryStore::new();
        let result = store.insert_round(&new_round(Uuid::new_v4(), 0)).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_recent_rounds_newest_first() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course("Harding Park", "San Francisco")).await.unwrap();
        for days_ago in [3, 0, 7, 1] {
            store.insert_round(&new_round(course.id, days_ago)).await.unwrap();
        }

        let recent = store.recent_rounds(course.id, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent.windows(2).all(|w| w[0].played_at >= w[1].played_at));
    }

    #[tokio::test]
    async fn test_search_counts_before_paging() {
        let store = MemoryStore::new();
        for name in ["Delta", "Alpha", "Charlie", "Bravo"] {
            let course = store.insert_course(&new_course(name, "Sacramento")).await.unwrap();
            store.approve_course(course.id).await.unwrap();
        }
        store.insert_course(&new_course("Echo", "Sacramento")).await.unwrap();

        let query = CourseQuery {
            text: None,
            state: Some("CA".to_string()),
            city: Some("sacra".to_string()),
            verified_only: true,
            order: StoreOrder::NameAsc,
            limit: Some(2),
            offset: 1,
        };
        let page = store.search_courses(&query).await.unwrap();

        assert_eq!(page.total, 4);
        let names: Vec<&str> = page.courses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bravo", "Charlie"]);
    }

    #[tokio::test]
    async fn test_name_sort_is_idempotent() {
        let store = MemoryStore::new();
        for name in ["Pasatiempo", "Bayonet", "Pacific Grove", "Black Horse"] {
            let course = store.insert_course(&new_course(name, "Monterey")).await.unwrap();
            store.approve_course(course.id).await.unwrap();
        }

        let query = CourseQuery {
            text: None,
            state: None,
            city: None,
            verified_only: true,
            order: StoreOrder::NameAsc,
            limit: None,
            offset: 0,
        };
        let mut sorted = store.search_courses(&query).await.unwrap().courses;
        let first: Vec<Uuid> = sorted.iter().map(|c| c.id).collect();

        sort_courses(&mut sorted, StoreOrder::NameAsc);
        let again: Vec<Uuid> = sorted.iter().map(|c| c.id).collect();

        assert_eq!(first, again);
        let names: Vec<&str> = sorted.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bayonet", "Black Horse", "Pacific Grove", "Pasatiempo"]);
    }

    #[tokio::test]
    async fn test_created_order_is_newest_first() {
        let store = MemoryStore::new();
        for name in ["Oldest", "Middle", "Newest"] {
            let course = store.insert_course(&new_course(name, "Salinas")).await.unwrap();
            store.approve_course(course.id).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let query = CourseQuery {
            text: None,
            state: None,
            city: None,
            verified_only: true,
            order: StoreOrder::CreatedDesc,
            limit: Some(10),
            offset: 0,
        };
        let page = store.search_courses(&query).await.unwrap();
        let names: Vec<&str> = page.courses.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["Newest", "Middle", "Oldest"]);
    }

    #[tokio::test]
    async fn test_duplicate_lookup() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course("Presidio", "San Francisco")).await.unwrap();

        let found = store.find_duplicate("Presidio", "San Francisco", "CA").await.unwrap();
        assert_eq!(found, Some(course.id));

        let other_city = store.find_duplicate("Presidio", "Oakland", "CA").await.unwrap();
        assert_eq!(other_city, None);
    }
}
