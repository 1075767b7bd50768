/// Process-local backend.
pub mod memory;
#[cfg(feature = "mongo-store")]
/// MongoDB backend.
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::models::{
    AnswerSubmissionEntity, EntityId, GameEntity, NewAnswerSubmission, NewGame, NewQuestion,
    NewTeam, NewUser, QuestionEntity, QuestionPatch, RoundEntity, SubmissionRow, TeamEntity,
    UserEntity,
};
use crate::dao::storage::StorageResult;
use crate::state::state_machine::GamePhase;

pub use memory::InMemoryEntityStore;

/// Abstraction over the persistence layer for trivia entities.
///
/// Every call is atomic on its own. Operations that reference a missing record fail with
/// [`StorageError::NotFound`](crate::dao::storage::StorageError::NotFound); `find_*`
/// lookups return `None` instead.
pub trait EntityStore: Send + Sync {
    /// Create a game together with its rounds numbered 1 to 6.
    fn create_game(&self, game: NewGame) -> BoxFuture<'static, StorageResult<GameEntity>>;
    fn find_game(&self, id: EntityId) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn update_game_phase(
        &self,
        id: EntityId,
        phase: GamePhase,
    ) -> BoxFuture<'static, StorageResult<GameEntity>>;
    fn update_current_question(
        &self,
        id: EntityId,
        question_id: Option<EntityId>,
    ) -> BoxFuture<'static, StorageResult<GameEntity>>;

    /// Rounds of a game ordered by number.
    fn list_rounds(&self, game_id: EntityId)
    -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>>;

    fn create_question(
        &self,
        question: NewQuestion,
    ) -> BoxFuture<'static, StorageResult<QuestionEntity>>;
    fn find_question(
        &self,
        id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    fn update_question(
        &self,
        id: EntityId,
        patch: QuestionPatch,
    ) -> BoxFuture<'static, StorageResult<QuestionEntity>>;
    /// Questions of a round ordered by their position.
    fn list_round_questions(
        &self,
        round_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Questions of a game ordered by round number, then position.
    fn list_game_questions(
        &self,
        game_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;

    fn create_team(&self, team: NewTeam) -> BoxFuture<'static, StorageResult<TeamEntity>>;
    fn find_team(&self, id: EntityId) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;

    fn create_user(&self, user: NewUser) -> BoxFuture<'static, StorageResult<UserEntity>>;
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;

    /// Append a graded submission to the history.
    fn record_submission(
        &self,
        submission: NewAnswerSubmission,
    ) -> BoxFuture<'static, StorageResult<AnswerSubmissionEntity>>;
    /// Every submission made to a question of the game, joined with its team.
    fn list_submission_rows(
        &self,
        game_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<SubmissionRow>>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
