//! Team and user registration.

use tracing::info;
use validator::Validate;

use crate::{
    dao::models::{NewTeam, TeamEntity, UserEntity},
    dto::user::CreateUserRequest,
    error::ServiceError,
    state::SharedState,
};

/// Register a team under a trimmed name.
pub async fn create_team(state: &SharedState, name: String) -> Result<TeamEntity, ServiceError> {
    let store = state.require_store().await?;
    let team = store
        .create_team(NewTeam {
            name: name.trim().to_owned(),
        })
        .await?;
    info!(team_id = team.id, name = %team.name, "team created");
    Ok(team)
}

/// Every registered team.
pub async fn list_teams(state: &SharedState) -> Result<Vec<TeamEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_teams().await?)
}

/// Register a user. Team members must reference an existing team, hosts none.
pub async fn create_user(
    state: &SharedState,
    request: CreateUserRequest,
) -> Result<UserEntity, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;
    let user = store.create_user(request.into()).await?;
    info!(user_id = user.id, role = ?user.role, team_id = ?user.team_id, "user created");
    Ok(user)
}

/// Every registered user.
pub async fn list_users(state: &SharedState) -> Result<Vec<UserEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_users().await?)
}
