use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{AnswerSubmissionEntity, EntityId},
    dto::{format_system_time, validation::MAX_ANSWER_CHARS},
};

/// Answer sent by a team for a question.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitAnswerRequest {
    /// Question being answered.
    pub question_id: EntityId,
    /// Team answering.
    pub team_id: EntityId,
    #[validate(length(max = MAX_ANSWER_CHARS))]
    /// Free text, graded case-insensitively after trimming.
    pub answer_text: String,
}

/// Recorded submission with its grading.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionView {
    /// Submission identifier.
    pub id: EntityId,
    /// Question answered.
    pub question_id: EntityId,
    /// Submitting team.
    pub team_id: EntityId,
    /// Text as submitted.
    pub answer_text: String,
    /// Whether the answer matched; `false` for unknown questions.
    pub is_correct: bool,
    /// RFC 3339 timestamp.
    pub submitted_at: String,
}

impl From<AnswerSubmissionEntity> for SubmissionView {
    fn from(submission: AnswerSubmissionEntity) -> Self {
        Self {
            id: submission.id,
            question_id: submission.question_id,
            team_id: submission.team_id,
            answer_text: submission.answer_text,
            is_correct: submission.is_correct.unwrap_or(false),
            submitted_at: format_system_time(submission.submitted_at),
        }
    }
}
