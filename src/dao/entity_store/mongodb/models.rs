use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use crate::{
    dao::models::{
        AnswerSubmissionEntity, EntityId, GameEntity, QuestionEntity, RoundEntity, TeamEntity,
        UserEntity, UserRole,
    },
    state::state_machine::GamePhase,
};

pub const GAME_COLLECTION: &str = "games";
pub const ROUND_COLLECTION: &str = "rounds";
pub const QUESTION_COLLECTION: &str = "questions";
pub const TEAM_COLLECTION: &str = "teams";
pub const USER_COLLECTION: &str = "users";
pub const SUBMISSION_COLLECTION: &str = "answer_submissions";
pub const COUNTER_COLLECTION: &str = "counters";

/// Per-collection sequence used to hand out integer ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterDocument {
    #[serde(rename = "_id")]
    pub collection: String,
    pub seq: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: EntityId,
    title: String,
    phase: GamePhase,
    current_question_id: Option<EntityId>,
    created_at: DateTime,
    updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRoundDocument {
    #[serde(rename = "_id")]
    id: EntityId,
    game_id: EntityId,
    number: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    #[serde(rename = "_id")]
    id: EntityId,
    round_id: EntityId,
    game_id: EntityId,
    round_number: u8,
    order: u8,
    text: String,
    answer: String,
    media_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    id: EntityId,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: EntityId,
    name: String,
    role: UserRole,
    team_id: Option<EntityId>,
}

/// Submission document. `game_id` is resolved from the question when the submission is
/// recorded so scoring can filter on it directly; it is `None` for unknown questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSubmissionDocument {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub question_id: EntityId,
    pub game_id: Option<EntityId>,
    pub team_id: EntityId,
    pub answer_text: String,
    pub is_correct: Option<bool>,
    pub submitted_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            phase: value.phase,
            current_question_id: value.current_question_id,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            title: value.title,
            phase: value.phase,
            current_question_id: value.current_question_id,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

impl From<RoundEntity> for MongoRoundDocument {
    fn from(value: RoundEntity) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            number: value.number,
        }
    }
}

impl From<MongoRoundDocument> for RoundEntity {
    fn from(value: MongoRoundDocument) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            number: value.number,
        }
    }
}

impl From<QuestionEntity> for MongoQuestionDocument {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            round_id: value.round_id,
            game_id: value.game_id,
            round_number: value.round_number,
            order: value.order,
            text: value.text,
            answer: value.answer,
            media_url: value.media_url,
        }
    }
}

impl From<MongoQuestionDocument> for QuestionEntity {
    fn from(value: MongoQuestionDocument) -> Self {
        Self {
            id: value.id,
            round_id: value.round_id,
            game_id: value.game_id,
            round_number: value.round_number,
            order: value.order,
            text: value.text,
            answer: value.answer,
            media_url: value.media_url,
        }
    }
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<MongoTeamDocument> for TeamEntity {
    fn from(value: MongoTeamDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            role: value.role,
            team_id: value.team_id,
        }
    }
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            role: value.role,
            team_id: value.team_id,
        }
    }
}

impl From<MongoSubmissionDocument> for AnswerSubmissionEntity {
    fn from(value: MongoSubmissionDocument) -> Self {
        Self {
            id: value.id,
            question_id: value.question_id,
            team_id: value.team_id,
            answer_text: value.answer_text,
            is_correct: value.is_correct,
            submitted_at: value.submitted_at.to_system_time(),
        }
    }
}

pub fn doc_id(id: EntityId) -> Document {
    doc! {"_id": id}
}
