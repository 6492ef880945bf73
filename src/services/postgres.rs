use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{
    Course, CourseOption, CoursePage, CourseQuery, NewCourse, NewRound, RoundSample,
    RoundSubmission, StoreOrder,
};
use crate::services::store::{CourseStore, StoreError};

const COURSE_COLUMNS: &str = "id, name, address, city, state, zip_code, country, latitude, \
     longitude, number_of_holes, par, phone, website, verified, created_at, updated_at";

const ROUND_COLUMNS: &str = "id, course_id, user_id, played_at, duration_minutes, \
     number_of_players, holes_played, day_of_week, time_of_day, walk_or_cart, \
     weather_conditions, notes, created_at";

/// PostgreSQL-backed course store
///
/// Courses and round submissions live in two tables; the foreign key on
/// `round_submissions.course_id` cascades deletes.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

#[async_trait]
impl CourseStore for PostgresClient {
    async fn insert_course(&self, course: &NewCourse) -> Result<Course, StoreError> {
        let query = format!(
            r#"
            INSERT INTO courses (name, address, city, state, zip_code, country,
                                 latitude, longitude, number_of_holes, par, phone, website)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COURSE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Course>(&query)
            .bind(&course.name)
            .bind(&course.address)
            .bind(&course.city)
            .bind(&course.state)
            .bind(&course.zip_code)
            .bind(&course.country)
            .bind(course.latitude)
            .bind(course.longitude)
            .bind(course.number_of_holes)
            .bind(course.par)
            .bind(&course.phone)
            .bind(&course.website)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Inserted course {} ({})", row.id, row.name);

        Ok(row)
    }

    async fn find_duplicate(
        &self,
        name: &str,
        city: &str,
        state: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        let query = r#"
            SELECT id
            FROM courses
            WHERE name = $1 AND city = $2 AND state = $3
            LIMIT 1
        "#;

        let id = sqlx::query_scalar::<_, Uuid>(query)
            .bind(name)
            .bind(city)
            .bind(state)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");

        let course = sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(course)
    }

    async fn save_course(&self, course: &Course) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE courses
            SET name = $2, address = $3, city = $4, state = $5, zip_code = $6,
                country = $7, latitude = $8, longitude = $9, number_of_holes = $10,
                par = $11, phone = $12, website = $13, updated_at = $14
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(course.id)
            .bind(&course.name)
            .bind(&course.address)
            .bind(&course.city)
            .bind(&course.state)
            .bind(&course.zip_code)
            .bind(&course.country)
            .bind(course.latitude)
            .bind(course.longitude)
            .bind(course.number_of_holes)
            .bind(course.par)
            .bind(&course.phone)
            .bind(&course.website)
            .bind(course.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn approve_course(&self, id: Uuid) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE courses
            SET verified = TRUE, updated_at = NOW()
            WHERE id = $1
        "#;

        let result = sqlx::query(query).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_unverified(&self) -> Result<Vec<Course>, StoreError> {
        let query = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE verified = FALSE ORDER BY created_at DESC"
        );

        let courses = sqlx::query_as::<_, Course>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(courses)
    }

    async fn list_course_options(&self) -> Result<Vec<CourseOption>, StoreError> {
        let query = r#"
            SELECT id, name, city, state
            FROM courses
            WHERE verified = TRUE
            ORDER BY name ASC, id ASC
        "#;

        let options = sqlx::query_as::<_, CourseOption>(query)
            .fetch_all(&self.pool)
            .await?;

        Ok(options)
    }

    async fn search_courses(&self, query: &CourseQuery) -> Result<CoursePage, StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses");
        push_filters(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page = QueryBuilder::<Postgres>::new(format!("SELECT {COURSE_COLUMNS} FROM courses"));
        push_filters(&mut page, query);
        page.push(match query.order {
            StoreOrder::NameAsc => " ORDER BY name ASC, id ASC",
            StoreOrder::CreatedDesc => " ORDER BY created_at DESC, id ASC",
        });
        if let Some(limit) = query.limit {
            page.push(" LIMIT ").push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        page.push(" OFFSET ")
            .push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));

        let courses = page
            .build_query_as::<Course>()
            .fetch_all(&self.pool)
            .await?;

        Ok(CoursePage { courses, total })
    }

    async fn insert_round(&self, round: &NewRound) -> Result<RoundSubmission, StoreError> {
        let query = format!(
            r#"
            INSERT INTO round_submissions (course_id, user_id, played_at, duration_minutes,
                                           number_of_players, holes_played, day_of_week,
                                           time_of_day, walk_or_cart, weather_conditions, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ROUND_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, RoundSubmission>(&query)
            .bind(round.course_id)
            .bind(&round.user_id)
            .bind(round.played_at)
            .bind(round.duration_minutes)
            .bind(round.number_of_players)
            .bind(round.holes_played)
            .bind(round.day_of_week)
            .bind(round.time_of_day)
            .bind(round.walk_or_cart)
            .bind(round.weather_conditions)
            .bind(&round.notes)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn round_samples(&self, course_id: Uuid) -> Result<Vec<RoundSample>, StoreError> {
        let query = r#"
            SELECT duration_minutes, day_of_week, played_at
            FROM round_submissions
            WHERE course_id = $1
        "#;

        let samples = sqlx::query_as::<_, RoundSample>(query)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(samples)
    }

    async fn recent_rounds(
        &self,
        course_id: Uuid,
        limit: usize,
    ) -> Result<Vec<RoundSubmission>, StoreError> {
        let query = format!(
            r#"
            SELECT {ROUND_COLUMNS}
            FROM round_submissions
            WHERE course_id = $1
            ORDER BY played_at DESC
            LIMIT $2
            "#
        );

        let rounds = sqlx::query_as::<_, RoundSubmission>(&query)
            .bind(course_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rounds)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Append the store-level search constraints as a WHERE clause
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &CourseQuery) {
    builder.push(" WHERE TRUE");

    if query.verified_only {
        builder.push(" AND verified = TRUE");
    }

    if let Some(text) = &query.text {
        builder
            .push(" AND to_tsvector('english', name) @@ websearch_to_tsquery('english', ")
            .push_bind(text.clone())
            .push(")");
    }

    if let Some(state) = &query.state {
        builder.push(" AND state = ").push_bind(state.clone());
    }

    if let Some(city) = &query.city {
        builder
            .push(" AND city ILIKE ")
            .push_bind(format!("%{}%", escape_like(city)));
    }
}

/// Escape LIKE wildcards so user input only matches literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
