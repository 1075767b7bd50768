use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{EntityId, GameEntity, RoundEntity},
    dto::{format_system_time, validation::validate_not_blank},
    state::state_machine::GamePhase,
};

/// Payload used to create a game and its six rounds.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    #[validate(length(min = 1, max = 200), custom(function = validate_not_blank))]
    /// Title shown to players.
    pub title: String,
}

/// Request overwriting the phase of a game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPhaseRequest {
    /// Phase to store, in any order.
    pub phase: GamePhase,
}

/// Public projection of a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameView {
    /// Game identifier.
    pub id: EntityId,
    /// Title.
    pub title: String,
    /// Current phase.
    pub phase: GamePhase,
    /// Question last broadcast by the host, if any.
    pub current_question_id: Option<EntityId>,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 time of the last phase or pointer change.
    pub updated_at: String,
}

/// Public projection of a round.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundView {
    /// Round identifier.
    pub id: EntityId,
    /// Owning game.
    pub game_id: EntityId,
    /// Round number, 1 to 6.
    pub number: u8,
}

impl From<GameEntity> for GameView {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            title: game.title,
            phase: game.phase,
            current_question_id: game.current_question_id,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
        }
    }
}

impl From<RoundEntity> for RoundView {
    fn from(round: RoundEntity) -> Self {
        Self {
            id: round.id,
            game_id: round.game_id,
            number: round.number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let request = CreateGameRequest {
            title: "   ".into(),
        };
        assert!(request.validate().is_err());

        let request = CreateGameRequest {
            title: "Friday quiz".into(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn set_phase_uses_wire_names() {
        let request: SetPhaseRequest =
            serde_json::from_str(r#"{"phase":"leaderboard_phase_1"}"#).unwrap();
        assert_eq!(request.phase, GamePhase::LeaderboardPhase1);
    }
}
