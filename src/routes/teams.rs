use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_valid::Valid;

use crate::{
    dto::team::{CreateTeamRequest, TeamView},
    error::AppError,
    services::roster_service,
    state::SharedState,
};

/// Team registration routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/teams", get(list_teams).post(create_team))
}

#[utoipa::path(
    post,
    path = "/teams",
    tag = "roster",
    request_body = CreateTeamRequest,
    responses((status = 201, description = "Team created", body = TeamView))
)]
/// Register a team.
pub async fn create_team(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateTeamRequest>>,
) -> Result<(StatusCode, Json<TeamView>), AppError> {
    let team = roster_service::create_team(&state, payload.name).await?;
    Ok((StatusCode::CREATED, Json(team.into())))
}

#[utoipa::path(
    get,
    path = "/teams",
    tag = "roster",
    responses((status = 200, description = "Every team", body = [TeamView]))
)]
/// List every team.
pub async fn list_teams(State(state): State<SharedState>) -> Result<Json<Vec<TeamView>>, AppError> {
    let teams = roster_service::list_teams(&state).await?;
    Ok(Json(teams.into_iter().map(Into::into).collect()))
}
