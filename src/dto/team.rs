use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{EntityId, TeamEntity},
    dto::validation::validate_not_blank,
};

/// Payload used to register a team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 100), custom(function = validate_not_blank))]
    /// Display name.
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Registered team.
pub struct TeamView {
    /// Team identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
}

impl From<TeamEntity> for TeamView {
    fn from(team: TeamEntity) -> Self {
        Self {
            id: team.id,
            name: team.name,
        }
    }
}
