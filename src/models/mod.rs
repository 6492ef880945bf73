// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Caller, Course, CourseHit, CourseOption, CoursePage, CourseQuery, CourseStats, GeoFilter,
    NewCourse, NewRound, PaceRating, RecentRound, RoundSample, RoundSubmission, SortKey,
    StoreOrder, TimeOfDay, TravelMode, Weather,
};
pub use requests::{
    CreateCourseRequest, CreateRoundRequest, SearchCoursesRequest, UpdateCourseRequest,
};
pub use responses::{
    CourseDetailResponse, CreatedCourse, CreatedRound, ErrorResponse, FieldIssue,
    HealthResponse, SearchCoursesResponse, SuccessResponse,
};
