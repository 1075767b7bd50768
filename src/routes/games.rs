use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dao::models::EntityId,
    dto::{
        game::{CreateGameRequest, GameView, RoundView, SetPhaseRequest},
        leaderboard::Leaderboard,
        question::{QuestionBroadcast, QuestionView},
    },
    error::AppError,
    routes::require_host_token,
    services::{game_service, question_service, scoring},
    state::{SharedState, transitions},
};

/// Game lifecycle, phase and read-only game views.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/rounds", get(list_rounds))
        .route("/games/{id}/phase", post(set_phase))
        .route(
            "/games/{id}/phase/advance",
            post(advance_phase).route_layer(middleware::from_fn_with_state(
                state,
                require_host_token,
            )),
        )
        .route("/games/{id}/questions", get(list_game_questions))
        .route("/games/{id}/leaderboard", get(get_leaderboard))
        .route("/games/{id}/current_question", get(get_current_question))
}

/// Create a game together with its six rounds.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameView),
        (status = 400, description = "Invalid title")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameView>), AppError> {
    let game = game_service::create_game(&state, payload.title).await?;
    Ok((StatusCode::CREATED, Json(game.into())))
}

#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    responses((status = 200, description = "Every game", body = [GameView]))
)]
/// List every game.
pub async fn list_games(State(state): State<SharedState>) -> Result<Json<Vec<GameView>>, AppError> {
    let games = game_service::list_games(&state).await?;
    Ok(Json(games.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = i64, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game", body = GameView),
        (status = 404, description = "Unknown game")
    )
)]
/// Read a game, including its current question pointer.
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/games/{id}/rounds",
    tag = "games",
    params(("id" = i64, Path, description = "Game identifier")),
    responses((status = 200, description = "Rounds ordered by number", body = [RoundView]))
)]
/// List the six rounds of a game.
pub async fn list_rounds(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Vec<RoundView>>, AppError> {
    let rounds = game_service::list_rounds(&state, id).await?;
    Ok(Json(rounds.into_iter().map(Into::into).collect()))
}

/// Overwrite the phase of a game and broadcast a `phase_update`.
#[utoipa::path(
    post,
    path = "/games/{id}/phase",
    tag = "games",
    params(("id" = i64, Path, description = "Game identifier")),
    request_body = SetPhaseRequest,
    responses(
        (status = 200, description = "Phase updated", body = GameView),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn set_phase(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
    Json(payload): Json<SetPhaseRequest>,
) -> Result<Json<GameView>, AppError> {
    let game = transitions::set_phase(&state, id, payload.phase).await?;
    Ok(Json(game.into()))
}

/// Move a game to its next phase and broadcast a `phase_update`.
#[utoipa::path(
    post,
    path = "/games/{id}/phase/advance",
    tag = "host",
    params(
        ("X-Host-Token" = String, Header, description = "Shared host secret"),
        ("id" = i64, Path, description = "Game identifier")
    ),
    responses(
        (status = 200, description = "Phase advanced", body = GameView),
        (status = 401, description = "Missing or invalid host token"),
        (status = 409, description = "Game already finished")
    )
)]
pub async fn advance_phase(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<GameView>, AppError> {
    let game = transitions::advance_phase(&state, id).await?;
    Ok(Json(game.into()))
}

#[utoipa::path(
    get,
    path = "/games/{id}/questions",
    tag = "games",
    params(("id" = i64, Path, description = "Game identifier")),
    responses((status = 200, description = "Questions ordered by round then position", body = [QuestionView]))
)]
/// List the questions of a game, answers omitted.
pub async fn list_game_questions(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Vec<QuestionView>>, AppError> {
    let questions = question_service::list_game_questions(&state, id).await?;
    Ok(Json(questions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/games/{id}/leaderboard",
    tag = "games",
    params(("id" = i64, Path, description = "Game identifier")),
    responses((status = 200, description = "Standings, best team first", body = Leaderboard))
)]
/// Current standings of a game.
pub async fn get_leaderboard(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Leaderboard>, AppError> {
    Ok(Json(scoring::leaderboard(&state, id).await?))
}

/// Question currently on screen, for viewers that joined late.
#[utoipa::path(
    get,
    path = "/games/{id}/current_question",
    tag = "games",
    params(("id" = i64, Path, description = "Game identifier")),
    responses((status = 200, description = "Current question or null", body = QuestionBroadcast))
)]
pub async fn get_current_question(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Option<QuestionBroadcast>>, AppError> {
    Ok(Json(question_service::current_question(&state, id).await?))
}
