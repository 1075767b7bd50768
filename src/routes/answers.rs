use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use axum_valid::Valid;

use crate::{
    dto::answer::{SubmissionView, SubmitAnswerRequest},
    error::AppError,
    services::answer_service,
    state::SharedState,
};

/// Answer intake route.
pub fn router() -> Router<SharedState> {
    Router::new().route("/answers", post(submit_answer))
}

/// Record a team's answer and broadcast the refreshed leaderboard.
#[utoipa::path(
    post,
    path = "/answers",
    tag = "answers",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 201, description = "Submission recorded and graded", body = SubmissionView),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SubmitAnswerRequest>>,
) -> Result<(StatusCode, Json<SubmissionView>), AppError> {
    let submission = answer_service::submit_answer(
        &state,
        payload.question_id,
        payload.team_id,
        payload.answer_text,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}
