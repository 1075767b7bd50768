use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dao::models::EntityId, dto::question::QuestionView, error::AppError,
    services::question_service, state::SharedState,
};

/// Round-scoped routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/rounds/{id}/questions", get(list_round_questions))
}

#[utoipa::path(
    get,
    path = "/rounds/{id}/questions",
    tag = "questions",
    params(("id" = i64, Path, description = "Round identifier")),
    responses((status = 200, description = "Questions ordered by position", body = [QuestionView]))
)]
/// List the questions of a round by position, answers omitted.
pub async fn list_round_questions(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Vec<QuestionView>>, AppError> {
    let questions = question_service::list_round_questions(&state, id).await?;
    Ok(Json(questions.into_iter().map(Into::into).collect()))
}
