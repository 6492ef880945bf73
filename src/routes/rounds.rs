use actix_web::{web, HttpRequest, HttpResponse};

use super::{authenticate, revalidate, AppState};
use crate::error::ActionError;
use crate::models::{CreateRoundRequest, CreatedRound, SuccessResponse};
use crate::services::rounds;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/rounds", web::post().to(create_round));
}

/// Report a round
///
/// POST /api/v1/rounds
///
/// Request body:
/// ```json
/// {
///   "course_id": "uuid",
///   "played_date": "2024-06-01",
///   "tee_time": "7:30",
///   "duration_minutes": 255,
///   "number_of_players": 4,
///   "holes_played": 18,
///   "walk_or_cart": "walk|cart|mixed",
///   "weather_conditions": "sunny",
///   "notes": "string"
/// }
/// ```
async fn create_round(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    body: web::Json<CreateRoundRequest>,
) -> Result<HttpResponse, ActionError> {
    let caller = authenticate(&state, &http_req).await?;

    let round = rounds::create_round(state.store.as_ref(), &caller, body.into_inner()).await?;
    revalidate(&state, round.course_id).await;

    Ok(HttpResponse::Created().json(SuccessResponse::with_data(
        "Round submitted successfully",
        CreatedRound { round_id: round.id },
    )))
}
