use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::{EntityId, NewUser, UserEntity, UserRole},
    dto::validation::validate_not_blank,
};

/// Payload used to register a user.
///
/// Team members must reference their team; hosts must not.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Display name.
    pub name: String,
    /// Host or team member.
    pub role: UserRole,
    #[serde(default)]
    /// Required for team members, forbidden for hosts.
    pub team_id: Option<EntityId>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_not_blank(&self.name) {
            errors.add("name", e);
        }

        match (self.role, self.team_id) {
            (UserRole::TeamMember, None) => {
                let mut err = ValidationError::new("team_id_required");
                err.message = Some("Team members must belong to a team".into());
                errors.add("team_id", err);
            }
            (UserRole::Host, Some(_)) => {
                let mut err = ValidationError::new("team_id_forbidden");
                err.message = Some("Hosts cannot belong to a team".into());
                errors.add("team_id", err);
            }
            _ => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            name: request.name.trim().to_owned(),
            role: request.role,
            team_id: request.team_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Registered user.
pub struct UserView {
    /// User identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Host or team member.
    pub role: UserRole,
    /// Team of a team member.
    pub team_id: Option<EntityId>,
}

impl From<UserEntity> for UserView {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            team_id: user.team_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: UserRole, team_id: Option<EntityId>) -> CreateUserRequest {
        CreateUserRequest {
            name: "Ada".into(),
            role,
            team_id,
        }
    }

    #[test]
    fn team_member_requires_team() {
        assert!(request(UserRole::TeamMember, None).validate().is_err());
        assert!(request(UserRole::TeamMember, Some(3)).validate().is_ok());
    }

    #[test]
    fn host_cannot_have_team() {
        assert!(request(UserRole::Host, Some(3)).validate().is_err());
        assert!(request(UserRole::Host, None).validate().is_ok());
    }

    #[test]
    fn role_uses_snake_case() {
        let parsed: CreateUserRequest =
            serde_json::from_str(r#"{"name":"Bo","role":"team_member","team_id":1}"#).unwrap();
        assert_eq!(parsed.role, UserRole::TeamMember);
        assert_eq!(parsed.team_id, Some(1));
    }
}
