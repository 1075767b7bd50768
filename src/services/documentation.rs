use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the trivia live backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::games::create_game,
        crate::routes::games::list_games,
        crate::routes::games::get_game,
        crate::routes::games::list_rounds,
        crate::routes::games::set_phase,
        crate::routes::games::advance_phase,
        crate::routes::games::list_game_questions,
        crate::routes::games::get_leaderboard,
        crate::routes::games::get_current_question,
        crate::routes::questions::create_question,
        crate::routes::questions::get_question,
        crate::routes::questions::update_question,
        crate::routes::questions::broadcast_question,
        crate::routes::rounds::list_round_questions,
        crate::routes::teams::create_team,
        crate::routes::teams::list_teams,
        crate::routes::users::create_user,
        crate::routes::users::list_users,
        crate::routes::answers::submit_answer,
        crate::routes::sse::live_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::SetPhaseRequest,
            crate::dto::game::GameView,
            crate::dto::game::RoundView,
            crate::dto::question::CreateQuestionRequest,
            crate::dto::question::UpdateQuestionRequest,
            crate::dto::question::QuestionView,
            crate::dto::question::HostQuestionView,
            crate::dto::question::QuestionSummary,
            crate::dto::question::QuestionBroadcast,
            crate::dto::team::CreateTeamRequest,
            crate::dto::team::TeamView,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::UserView,
            crate::dto::answer::SubmitAnswerRequest,
            crate::dto::answer::SubmissionView,
            crate::dto::leaderboard::Leaderboard,
            crate::dto::leaderboard::TeamStanding,
            crate::dto::live::LiveEvent,
            crate::dto::live::ConnectedEvent,
            crate::dto::live::PhaseUpdateEvent,
            crate::dto::live::ViewerMessageEvent,
            crate::dao::models::UserRole,
            crate::state::state_machine::GamePhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Games, rounds, phases and leaderboards"),
        (name = "host", description = "Operations gated by the X-Host-Token header"),
        (name = "questions", description = "Public question views, answers omitted"),
        (name = "roster", description = "Teams and users"),
        (name = "answers", description = "Answer intake and grading"),
        (name = "live", description = "WebSocket and server-sent event viewers"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_live_and_host_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/ws", "/sse", "/questions/{id}/broadcast", "/games/{id}/phase/advance"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
