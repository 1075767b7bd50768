//! Question payloads. Only the host-facing views carry the canonical answer.

use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{EntityId, NewQuestion, QuestionEntity, QuestionPatch},
    dto::validation::{MAX_ANSWER_CHARS, validate_not_blank, validate_question_order},
};

/// Payload used by the host to add a question to a round.
#[serde_as]
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateQuestionRequest {
    /// Round receiving the question.
    pub round_id: EntityId,
    #[validate(custom(function = validate_question_order))]
    /// Position inside the round, 1 to 10.
    pub order: u8,
    #[validate(custom(function = validate_not_blank))]
    /// Question text.
    pub text: String,
    #[validate(custom(function = validate_not_blank), length(max = MAX_ANSWER_CHARS))]
    /// Canonical answer.
    pub answer: String,
    /// Reference to an image or video. An empty string means no media.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub media_url: Option<String>,
}

/// Partial question update. Absent (or empty `media_url`) fields are left untouched.
#[serde_as]
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateQuestionRequest {
    #[serde(default)]
    #[validate(custom(function = validate_not_blank))]
    /// New question text.
    pub text: Option<String>,
    #[serde(default)]
    #[validate(custom(function = validate_not_blank), length(max = MAX_ANSWER_CHARS))]
    /// New canonical answer.
    pub answer: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    /// New media reference; empty means unchanged.
    pub media_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = validate_question_order))]
    /// New position inside the round.
    pub order: Option<u8>,
}

impl From<CreateQuestionRequest> for NewQuestion {
    fn from(request: CreateQuestionRequest) -> Self {
        Self {
            round_id: request.round_id,
            order: request.order,
            text: request.text,
            answer: request.answer,
            media_url: request.media_url,
        }
    }
}

impl From<UpdateQuestionRequest> for QuestionPatch {
    fn from(request: UpdateQuestionRequest) -> Self {
        Self {
            text: request.text,
            answer: request.answer,
            media_url: request.media_url,
            order: request.order,
        }
    }
}

/// Question as shown to players.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionView {
    /// Question identifier.
    pub id: EntityId,
    /// Owning round.
    pub round_id: EntityId,
    /// Owning game.
    pub game_id: EntityId,
    /// Number of the owning round.
    pub round_number: u8,
    /// Position inside the round.
    pub order: u8,
    /// Question text.
    pub text: String,
    /// Optional media reference.
    pub media_url: Option<String>,
}

/// Question as shown to the host, including the canonical answer.
#[derive(Debug, Serialize, ToSchema)]
pub struct HostQuestionView {
    #[serde(flatten)]
    /// Public fields.
    pub question: QuestionView,
    /// Canonical answer.
    pub answer: String,
}

/// Reduced question carried by the live `question` event.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct QuestionSummary {
    /// Question identifier.
    pub id: EntityId,
    /// Question text.
    pub text: String,
    /// Optional media reference.
    pub media_url: Option<String>,
    /// Position inside the round.
    pub order: u8,
}

/// Question currently broadcast in a game, with its position.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct QuestionBroadcast {
    /// Game the question belongs to.
    pub game_id: EntityId,
    /// Round number of the question.
    pub round_number: u8,
    /// Question without its answer.
    pub question: QuestionSummary,
}

impl From<QuestionEntity> for QuestionView {
    fn from(question: QuestionEntity) -> Self {
        Self {
            id: question.id,
            round_id: question.round_id,
            game_id: question.game_id,
            round_number: question.round_number,
            order: question.order,
            text: question.text,
            media_url: question.media_url,
        }
    }
}

impl From<QuestionEntity> for HostQuestionView {
    fn from(mut question: QuestionEntity) -> Self {
        let answer = std::mem::take(&mut question.answer);
        Self {
            question: question.into(),
            answer,
        }
    }
}

impl From<QuestionEntity> for QuestionBroadcast {
    fn from(question: QuestionEntity) -> Self {
        Self {
            game_id: question.game_id,
            round_number: question.round_number,
            question: QuestionSummary {
                id: question.id,
                text: question.text,
                media_url: question.media_url,
                order: question.order,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_media_url_is_none() {
        let request: CreateQuestionRequest = serde_json::from_str(
            r#"{"round_id":1,"order":2,"text":"Capital of France?","answer":"Paris","media_url":""}"#,
        )
        .unwrap();
        assert_eq!(request.media_url, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn update_accepts_partial_body() {
        let request: UpdateQuestionRequest = serde_json::from_str(r#"{"answer":"paris"}"#).unwrap();
        assert!(request.validate().is_ok());
        let patch = QuestionPatch::from(request);
        assert_eq!(patch.answer.as_deref(), Some("paris"));
        assert!(patch.text.is_none() && patch.media_url.is_none() && patch.order.is_none());
    }

    #[test]
    fn out_of_range_order_is_rejected() {
        let request = UpdateQuestionRequest {
            order: Some(11),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn create_checks_order_through_derive() {
        let request: CreateQuestionRequest = serde_json::from_str(
            r#"{"round_id":1,"order":0,"text":"Capital of France?","answer":"Paris"}"#,
        )
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("order"));
    }

    #[test]
    fn canonical_answer_shares_the_submission_cap() {
        let at_cap = UpdateQuestionRequest {
            answer: Some("a".repeat(500)),
            ..Default::default()
        };
        assert!(at_cap.validate().is_ok());

        let too_long = UpdateQuestionRequest {
            answer: Some("a".repeat(501)),
            ..Default::default()
        };
        let errors = too_long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("answer"));
    }

    #[test]
    fn broadcast_payload_has_no_answer() {
        let question = QuestionEntity {
            id: 7,
            round_id: 2,
            game_id: 1,
            round_number: 2,
            order: 3,
            text: "Capital of France?".into(),
            answer: "Paris".into(),
            media_url: None,
        };
        let json = serde_json::to_value(QuestionBroadcast::from(question)).unwrap();
        assert_eq!(json["game_id"], 1);
        assert_eq!(json["round_number"], 2);
        assert!(json["question"].get("answer").is_none());
        assert!(!json.to_string().contains("Paris"));
    }
}
