use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dao::models::EntityId,
    dto::question::{
        CreateQuestionRequest, HostQuestionView, QuestionBroadcast, QuestionView,
        UpdateQuestionRequest,
    },
    error::AppError,
    routes::require_host_token,
    services::question_service,
    state::SharedState,
};

/// Question reads for everyone, writes and broadcasts for the host.
pub fn router(state: SharedState) -> Router<SharedState> {
    let host_gate = || middleware::from_fn_with_state(state.clone(), require_host_token);

    Router::new()
        .route(
            "/questions",
            post(create_question).route_layer(host_gate()),
        )
        .route(
            "/questions/{id}",
            get(get_question).merge(put(update_question).route_layer(host_gate())),
        )
        .route(
            "/questions/{id}/broadcast",
            post(broadcast_question).route_layer(host_gate()),
        )
}

#[utoipa::path(
    post,
    path = "/questions",
    tag = "host",
    params(("X-Host-Token" = String, Header, description = "Shared host secret")),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = HostQuestionView),
        (status = 401, description = "Missing or invalid host token"),
        (status = 404, description = "Unknown round")
    )
)]
/// Add a question to a round.
pub async fn create_question(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateQuestionRequest>>,
) -> Result<(StatusCode, Json<HostQuestionView>), AppError> {
    let question = question_service::create_question(&state, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(question.into())))
}

#[utoipa::path(
    get,
    path = "/questions/{id}",
    tag = "questions",
    params(("id" = i64, Path, description = "Question identifier")),
    responses(
        (status = 200, description = "Question without its answer", body = QuestionView),
        (status = 404, description = "Unknown question")
    )
)]
/// Read a question without its answer.
pub async fn get_question(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<QuestionView>, AppError> {
    Ok(Json(question_service::get_question(&state, id).await?.into()))
}

/// Partially update a question; omitted fields keep their value.
#[utoipa::path(
    put,
    path = "/questions/{id}",
    tag = "host",
    params(
        ("X-Host-Token" = String, Header, description = "Shared host secret"),
        ("id" = i64, Path, description = "Question identifier")
    ),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Updated question", body = HostQuestionView),
        (status = 401, description = "Missing or invalid host token"),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn update_question(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
    Valid(Json(payload)): Valid<Json<UpdateQuestionRequest>>,
) -> Result<Json<HostQuestionView>, AppError> {
    let question = question_service::update_question(&state, id, payload.into()).await?;
    Ok(Json(question.into()))
}

/// Make the question current in its game and push it to every live viewer.
#[utoipa::path(
    post,
    path = "/questions/{id}/broadcast",
    tag = "host",
    params(
        ("X-Host-Token" = String, Header, description = "Shared host secret"),
        ("id" = i64, Path, description = "Question identifier")
    ),
    responses(
        (status = 200, description = "Payload sent to viewers", body = QuestionBroadcast),
        (status = 401, description = "Missing or invalid host token"),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn broadcast_question(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<QuestionBroadcast>, AppError> {
    Ok(Json(question_service::broadcast_question(&state, id).await?))
}
