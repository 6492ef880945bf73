use crate::models::{Course, CourseQuery};

/// Word-based name match, the in-process counterpart of a web-search style
/// full-text query
///
/// Every plain term must appear as a whole word of the name; a term written
/// as `-term` must not. Matching is case-insensitive and ignores punctuation.
pub fn matches_text(name: &str, query: &str) -> bool {
    let words = tokenize(name);

    // A query with no searchable words filters nothing
    for raw in query.split_whitespace() {
        let (negated, raw) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        for term in tokenize(raw) {
            let present = words.iter().any(|w| *w == term);
            if present == negated {
                return false;
            }
        }
    }

    true
}

/// Exact state/province match
#[inline]
pub fn matches_state(course: &Course, state: &str) -> bool {
    course.state.as_deref() == Some(state)
}

/// Case-insensitive partial city match
#[inline]
pub fn matches_city(course: &Course, city: &str) -> bool {
    match course.city.as_deref() {
        Some(value) => value.to_lowercase().contains(&city.to_lowercase()),
        None => false,
    }
}

/// Check a course against every store-level constraint of a query
pub fn matches_query(course: &Course, query: &CourseQuery) -> bool {
    if query.verified_only && !course.verified {
        return false;
    }

    if let Some(text) = query.text.as_deref() {
        if !matches_text(&course.name, text) {
            return false;
        }
    }

    if let Some(state) = query.state.as_deref() {
        if !matches_state(course, state) {
            return false;
        }
    }

    if let Some(city) = query.city.as_deref() {
        if !matches_city(course, city) {
            return false;
        }
    }

    true
}

fn tokenize(value: &str) -> Vec<String> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoreOrder;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_course(name: &str, city: &str, state: &str) -> Course {
        Course {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: None,
            city: Some(city.to_string()),
            state: Some(state.to_string()),
            zip_code: None,
            country: Some("US".to_string()),
            latitude: None,
            longitude: None,
            number_of_holes: Some(18),
            par: Some(72),
            phone: None,
            website: None,
            verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn query() -> CourseQuery {
        CourseQuery {
            text: None,
            state: None,
            city: None,
            verified_only: true,
            order: StoreOrder::NameAsc,
            limit: Some(50),
            offset: 0,
        }
    }

    #[test]
    fn test_text_is_word_based() {
        assert!(matches_text("Pebble Beach Golf Links", "pebble"));
        assert!(matches_text("Pebble Beach Golf Links", "Beach golf"));
        // Substrings of a word are not matches
        assert!(!matches_text("Pebble Beach Golf Links", "peb"));
        assert!(!matches_text("Pebble Beach Golf Links", "pebble dunes"));
    }

    #[test]
    fn test_text_negation() {
        assert!(matches_text("Spyglass Hill Golf Course", "golf -links"));
        assert!(!matches_text("Pebble Beach Golf Links", "golf -links"));
    }

    #[test]
    fn test_city_partial_case_insensitive() {
        let course = create_test_course("Torrey Pines", "San Diego", "CA");
        assert!(matches_city(&course, "diego"));
        assert!(matches_city(&course, "SAN"));
        assert!(!matches_city(&course, "Jose"));
    }

    #[test]
    fn test_state_exact() {
        let course = create_test_course("Torrey Pines", "San Diego", "CA");
        assert!(matches_state(&course, "CA"));
        assert!(!matches_state(&course, "ca"));
    }

    #[test]
    fn test_unverified_excluded() {
        let mut course = create_test_course("Torrey Pines", "San Diego", "CA");
        course.verified = false;

        assert!(!matches_query(&course, &query()));

        let mut q = query();
        q.verified_only = false;
        assert!(matches_query(&course, &q));
    }

    #[test]
    fn test_combined_filters() {
        let course = create_test_course("Torrey Pines South", "San Diego", "CA");

        let mut q = query();
        q.text = Some("torrey".to_string());
        q.state = Some("CA".to_string());
        q.city = Some("diego".to_string());
        assert!(matches_query(&course, &q));

        q.state = Some("AZ".to_string());
        assert!(!matches_query(&course, &q));
    }
}
