use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::EntityId;

/// One line of the leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct TeamStanding {
    /// Team identifier.
    pub team_id: EntityId,
    /// Team display name.
    pub team_name: String,
    /// Number of correct submissions made by the team in the game.
    pub points: u32,
}

/// Full standings of a game, best team first.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct Leaderboard {
    /// Game the standings belong to.
    pub game_id: EntityId,
    /// Best team first.
    pub standings: Vec<TeamStanding>,
}
