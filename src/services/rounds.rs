use crate::error::ActionError;
use crate::models::{Caller, CreateRoundRequest, RoundSubmission};
use crate::services::store::CourseStore;

/// Record a round for the calling user
///
/// `day_of_week` and `time_of_day` are derived from the tee time here and
/// nowhere else.
pub async fn create_round(
    store: &dyn CourseStore,
    caller: &Caller,
    request: CreateRoundRequest,
) -> Result<RoundSubmission, ActionError> {
    let round = request.prepare(&caller.user_id)?;

    if store.get_course(round.course_id).await?.is_none() {
        return Err(ActionError::NotFound("Selected course not found".to_string()));
    }

    let created = store.insert_round(&round).await?;
    tracing::info!(
        "User {} reported a {} minute round at course {}",
        caller.user_id,
        created.duration_minutes,
        created.course_id
    );

    Ok(created)
}
