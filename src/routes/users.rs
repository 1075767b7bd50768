use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dto::user::{CreateUserRequest, UserView},
    error::AppError,
    services::roster_service,
    state::SharedState,
};

/// User registration routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

/// Register a host or a team member.
#[utoipa::path(
    post,
    path = "/users",
    tag = "roster",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 400, description = "Role and team do not match"),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn create_user(
    State(state): State<SharedState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let user = roster_service::create_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "roster",
    responses((status = 200, description = "Every user", body = [UserView]))
)]
/// List every user.
pub async fn list_users(State(state): State<SharedState>) -> Result<Json<Vec<UserView>>, AppError> {
    let users = roster_service::list_users(&state).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}
