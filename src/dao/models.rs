use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;

use crate::state::state_machine::GamePhase;

/// Identifier type shared by every persisted record.
pub type EntityId = i64;

/// Number of rounds created alongside every game.
pub const ROUNDS_PER_GAME: u8 = 6;

/// Role held by a registered user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Drives the game: phases, questions, broadcasts.
    Host,
    /// Plays as part of a team.
    TeamMember,
}

/// Persisted game record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: EntityId,
    /// Title displayed to players.
    pub title: String,
    /// Phase the game is currently in.
    pub phase: GamePhase,
    /// Question currently broadcast to viewers, if any.
    pub current_question_id: Option<EntityId>,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last time the phase or current question changed.
    pub updated_at: SystemTime,
}

/// Round of a game. Rounds are created with their game and never change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundEntity {
    /// Store-assigned identifier.
    pub id: EntityId,
    /// Owning game.
    pub game_id: EntityId,
    /// Position of the round inside the game, from 1 to [`ROUNDS_PER_GAME`].
    pub number: u8,
}

/// Persisted question.
///
/// `game_id` and `round_number` are copied from the owning round when the question is
/// created so callers never have to walk the round to find the game. Rounds are
/// immutable, which keeps the copies accurate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Store-assigned identifier.
    pub id: EntityId,
    /// Owning round.
    pub round_id: EntityId,
    /// Game of the owning round, denormalized for lookups.
    pub game_id: EntityId,
    /// Number of the owning round, 1 to 6.
    pub round_number: u8,
    /// Position inside the round (1..10).
    pub order: u8,
    /// Question shown to viewers.
    pub text: String,
    /// Canonical answer used to grade submissions.
    pub answer: String,
    /// Opaque reference to an image or video shown with the question.
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A team competing in games.
pub struct TeamEntity {
    /// Store-assigned identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A registered participant.
pub struct UserEntity {
    /// Store-assigned identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Host or team member.
    pub role: UserRole,
    /// Set for team members, absent for hosts.
    pub team_id: Option<EntityId>,
}

/// A single answer sent by a team. Submissions are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerSubmissionEntity {
    /// Store-assigned identifier.
    pub id: EntityId,
    /// Question answered, possibly unknown to the store.
    pub question_id: EntityId,
    /// Submitting team.
    pub team_id: EntityId,
    /// Text as typed by the team.
    pub answer_text: String,
    /// Grading result, computed once when the submission is recorded.
    pub is_correct: Option<bool>,
    /// Time the store recorded the submission.
    pub submitted_at: SystemTime,
}

/// Row produced by joining a game's submissions with their teams, used for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRow {
    /// Team that submitted.
    pub team_id: EntityId,
    /// Name of that team at read time.
    pub team_name: String,
    /// Grading recorded with the submission.
    pub is_correct: bool,
}

/// Fields required to create a game.
#[derive(Debug, Clone)]
pub struct NewGame {
    /// Title shown to players.
    pub title: String,
}

/// Fields required to create a question inside an existing round.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    /// Round receiving the question.
    pub round_id: EntityId,
    /// Position inside the round, 1 to 10.
    pub order: u8,
    /// Question text.
    pub text: String,
    /// Canonical answer.
    pub answer: String,
    /// Optional image or video reference.
    pub media_url: Option<String>,
}

#[derive(Debug, Clone)]
/// Fields needed to register a team.
pub struct NewTeam {
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone)]
/// Fields needed to register a user.
pub struct NewUser {
    /// Display name, already trimmed.
    pub name: String,
    /// Host or team member.
    pub role: UserRole,
    /// Team of a team member; `None` for hosts.
    pub team_id: Option<EntityId>,
}

/// Graded submission ready to be appended to the history.
#[derive(Debug, Clone)]
pub struct NewAnswerSubmission {
    /// Question answered.
    pub question_id: EntityId,
    /// Submitting team.
    pub team_id: EntityId,
    /// Raw answer text.
    pub answer_text: String,
    /// Grading decided before the write.
    pub is_correct: bool,
}

/// Editable question fields. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPatch {
    /// New question text.
    pub text: Option<String>,
    /// New canonical answer.
    pub answer: Option<String>,
    /// New media reference.
    pub media_url: Option<String>,
    /// New position inside the round.
    pub order: Option<u8>,
}

impl QuestionPatch {
    /// Whether the patch would leave every field unchanged.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.answer.is_none()
            && self.media_url.is_none()
            && self.order.is_none()
    }

    /// Overwrite the provided fields on `question`.
    pub fn apply_to(self, question: &mut QuestionEntity) {
        if let Some(text) = self.text {
            question.text = text;
        }
        if let Some(answer) = self.answer {
            question.answer = answer;
        }
        if let Some(media_url) = self.media_url {
            question.media_url = Some(media_url);
        }
        if let Some(order) = self.order {
            question.order = order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> QuestionEntity {
        QuestionEntity {
            id: 1,
            round_id: 2,
            game_id: 3,
            round_number: 1,
            order: 4,
            text: "Capital of France?".into(),
            answer: "Paris".into(),
            media_url: None,
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut q = question();
        let patch = QuestionPatch::default();
        assert!(patch.is_empty());
        patch.apply_to(&mut q);
        assert_eq!(q, question());
    }

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut q = question();
        QuestionPatch {
            answer: Some("paris".into()),
            media_url: Some("/media/eiffel.jpg".into()),
            ..Default::default()
        }
        .apply_to(&mut q);

        assert_eq!(q.text, "Capital of France?");
        assert_eq!(q.answer, "paris");
        assert_eq!(q.media_url.as_deref(), Some("/media/eiffel.jpg"));
        assert_eq!(q.order, 4);
    }
}
