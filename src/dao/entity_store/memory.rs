//! Process-local entity store used by default and by the test-suite.

use std::{collections::BTreeMap, sync::Arc, time::SystemTime};

use futures::{FutureExt, future::BoxFuture};
use tokio::sync::RwLock;

use super::EntityStore;
use crate::{
    dao::{
        models::{
            AnswerSubmissionEntity, EntityId, GameEntity, NewAnswerSubmission, NewGame,
            NewQuestion, NewTeam, NewUser, QuestionEntity, QuestionPatch, ROUNDS_PER_GAME,
            RoundEntity, SubmissionRow, TeamEntity, UserEntity,
        },
        storage::{StorageError, StorageResult},
    },
    state::state_machine::GamePhase,
};

/// Entity store keeping every table in memory behind a single lock.
///
/// Each trait call takes the lock once, so every operation is atomic, including game
/// creation with its rounds.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    games: Table<GameEntity>,
    rounds: Table<RoundEntity>,
    questions: Table<QuestionEntity>,
    teams: Table<TeamEntity>,
    users: Table<UserEntity>,
    submissions: Table<AnswerSubmissionEntity>,
}

/// Rows keyed by id plus the last id handed out.
struct Table<T> {
    last_id: EntityId,
    rows: BTreeMap<EntityId, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(EntityId) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn get(&self, id: EntityId) -> Option<&T> {
        self.rows.get(&id)
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

impl InMemoryEntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T, F>(&self, f: F) -> BoxFuture<'static, StorageResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&Tables) -> StorageResult<T> + Send + 'static,
    {
        let tables = self.tables.clone();
        async move {
            let guard = tables.read().await;
            f(&guard)
        }
        .boxed()
    }

    fn write<T, F>(&self, f: F) -> BoxFuture<'static, StorageResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut Tables) -> StorageResult<T> + Send + 'static,
    {
        let tables = self.tables.clone();
        async move {
            let mut guard = tables.write().await;
            f(&mut guard)
        }
        .boxed()
    }
}

impl Tables {
    fn game_mut(&mut self, id: EntityId) -> StorageResult<&mut GameEntity> {
        self.games
            .get_mut(id)
            .ok_or_else(|| StorageError::not_found("game", id))
    }
}

impl EntityStore for InMemoryEntityStore {
    fn create_game(&self, game: NewGame) -> BoxFuture<'static, StorageResult<GameEntity>> {
        self.write(move |tables| {
            let now = SystemTime::now();
            let created = tables.games.insert_with(|id| GameEntity {
                id,
                title: game.title,
                phase: GamePhase::default(),
                current_question_id: None,
                created_at: now,
                updated_at: now,
            });
            for number in 1..=ROUNDS_PER_GAME {
                tables.rounds.insert_with(|id| RoundEntity {
                    id,
                    game_id: created.id,
                    number,
                });
            }
            Ok(created)
        })
    }

    fn find_game(&self, id: EntityId) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        self.read(move |tables| Ok(tables.games.get(id).cloned()))
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        self.read(|tables| Ok(tables.games.values().cloned().collect()))
    }

    fn update_game_phase(
        &self,
        id: EntityId,
        phase: GamePhase,
    ) -> BoxFuture<'static, StorageResult<GameEntity>> {
        self.write(move |tables| {
            let game = tables.game_mut(id)?;
            game.phase = phase;
            game.updated_at = SystemTime::now();
            Ok(game.clone())
        })
    }

    fn update_current_question(
        &self,
        id: EntityId,
        question_id: Option<EntityId>,
    ) -> BoxFuture<'static, StorageResult<GameEntity>> {
        self.write(move |tables| {
            let game = tables.game_mut(id)?;
            game.current_question_id = question_id;
            game.updated_at = SystemTime::now();
            Ok(game.clone())
        })
    }

    fn list_rounds(
        &self,
        game_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>> {
        self.read(move |tables| {
            let mut rounds: Vec<_> = tables
                .rounds
                .values()
                .filter(|round| round.game_id == game_id)
                .cloned()
                .collect();
            rounds.sort_by_key(|round| round.number);
            Ok(rounds)
        })
    }

    fn create_question(
        &self,
        question: NewQuestion,
    ) -> BoxFuture<'static, StorageResult<QuestionEntity>> {
        self.write(move |tables| {
            let round = tables
                .rounds
                .get(question.round_id)
                .cloned()
                .ok_or_else(|| StorageError::not_found("round", question.round_id))?;
            Ok(tables.questions.insert_with(|id| QuestionEntity {
                id,
                round_id: round.id,
                game_id: round.game_id,
                round_number: round.number,
                order: question.order,
                text: question.text,
                answer: question.answer,
                media_url: question.media_url,
            }))
        })
    }

    fn find_question(
        &self,
        id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        self.read(move |tables| Ok(tables.questions.get(id).cloned()))
    }

    fn update_question(
        &self,
        id: EntityId,
        patch: QuestionPatch,
    ) -> BoxFuture<'static, StorageResult<QuestionEntity>> {
        self.write(move |tables| {
            let question = tables
                .questions
                .get_mut(id)
                .ok_or_else(|| StorageError::not_found("question", id))?;
            patch.apply_to(question);
            Ok(question.clone())
        })
    }

    fn list_round_questions(
        &self,
        round_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        self.read(move |tables| {
            let mut questions: Vec<_> = tables
                .questions
                .values()
                .filter(|question| question.round_id == round_id)
                .cloned()
                .collect();
            questions.sort_by_key(|question| (question.order, question.id));
            Ok(questions)
        })
    }

    fn list_game_questions(
        &self,
        game_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        self.read(move |tables| {
            let mut questions: Vec<_> = tables
                .questions
                .values()
                .filter(|question| question.game_id == game_id)
                .cloned()
                .collect();
            questions.sort_by_key(|question| (question.round_number, question.order, question.id));
            Ok(questions)
        })
    }

    fn create_team(&self, team: NewTeam) -> BoxFuture<'static, StorageResult<TeamEntity>> {
        self.write(move |tables| {
            Ok(tables.teams.insert_with(|id| TeamEntity {
                id,
                name: team.name,
            }))
        })
    }

    fn find_team(&self, id: EntityId) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        self.read(move |tables| Ok(tables.teams.get(id).cloned()))
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        self.read(|tables| Ok(tables.teams.values().cloned().collect()))
    }

    fn create_user(&self, user: NewUser) -> BoxFuture<'static, StorageResult<UserEntity>> {
        self.write(move |tables| {
            if let Some(team_id) = user.team_id {
                if tables.teams.get(team_id).is_none() {
                    return Err(StorageError::not_found("team", team_id));
                }
            }
            Ok(tables.users.insert_with(|id| UserEntity {
                id,
                name: user.name,
                role: user.role,
                team_id: user.team_id,
            }))
        })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        self.read(|tables| Ok(tables.users.values().cloned().collect()))
    }

    fn record_submission(
        &self,
        submission: NewAnswerSubmission,
    ) -> BoxFuture<'static, StorageResult<AnswerSubmissionEntity>> {
        self.write(move |tables| {
            Ok(tables.submissions.insert_with(|id| AnswerSubmissionEntity {
                id,
                question_id: submission.question_id,
                team_id: submission.team_id,
                answer_text: submission.answer_text,
                is_correct: Some(submission.is_correct),
                submitted_at: SystemTime::now(),
            }))
        })
    }

    fn list_submission_rows(
        &self,
        game_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<SubmissionRow>>> {
        self.read(move |tables| {
            let rows = tables
                .submissions
                .values()
                .filter(|submission| {
                    tables
                        .questions
                        .get(submission.question_id)
                        .is_some_and(|question| question.game_id == game_id)
                })
                .filter_map(|submission| {
                    let team = tables.teams.get(submission.team_id)?;
                    Some(SubmissionRow {
                        team_id: team.id,
                        team_name: team.name.clone(),
                        is_correct: submission.is_correct.unwrap_or(false),
                    })
                })
                .collect();
            Ok(rows)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        futures::future::ready(Ok(())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_game() -> (InMemoryEntityStore, GameEntity) {
        let store = InMemoryEntityStore::new();
        let game = store
            .create_game(NewGame {
                title: "Pub quiz".into(),
            })
            .await
            .unwrap();
        (store, game)
    }

    fn new_question(round_id: EntityId, order: u8, answer: &str) -> NewQuestion {
        NewQuestion {
            round_id,
            order,
            text: format!("Question {order}"),
            answer: answer.into(),
            media_url: None,
        }
    }

    #[tokio::test]
    async fn creating_a_game_creates_six_numbered_rounds() {
        let (store, game) = store_with_game().await;

        assert_eq!(game.phase, GamePhase::Gathering);
        assert_eq!(game.current_question_id, None);

        let rounds = store.list_rounds(game.id).await.unwrap();
        let numbers: Vec<u8> = rounds.iter().map(|round| round.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert!(rounds.iter().all(|round| round.game_id == game.id));

        let other = store
            .create_game(NewGame {
                title: "Second".into(),
            })
            .await
            .unwrap();
        assert_eq!(store.list_rounds(other.id).await.unwrap().len(), 6);
        assert_eq!(store.list_rounds(game.id).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn question_carries_its_round_and_game() {
        let (store, game) = store_with_game().await;
        let round = store.list_rounds(game.id).await.unwrap()[2].clone();

        let question = store
            .create_question(new_question(round.id, 1, "Paris"))
            .await
            .unwrap();

        assert_eq!(question.round_id, round.id);
        assert_eq!(question.game_id, game.id);
        assert_eq!(question.round_number, 3);
        assert_eq!(store.find_question(question.id).await.unwrap(), Some(question));
    }

    #[tokio::test]
    async fn missing_references_fail_with_not_found() {
        let store = InMemoryEntityStore::new();

        let err = store
            .create_question(new_question(42, 1, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "round", id: 42 }));

        let err = store
            .update_game_phase(7, GamePhase::Finished)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "game", id: 7 }));

        let err = store
            .update_question(3, QuestionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "question", .. }));

        let err = store
            .create_user(NewUser {
                name: "Ann".into(),
                role: crate::dao::models::UserRole::TeamMember,
                team_id: Some(9),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "team", id: 9 }));
    }

    #[tokio::test]
    async fn partial_update_keeps_absent_fields() {
        let (store, game) = store_with_game().await;
        let round = store.list_rounds(game.id).await.unwrap()[0].clone();
        let question = store
            .create_question(new_question(round.id, 2, "Paris"))
            .await
            .unwrap();

        let updated = store
            .update_question(
                question.id,
                QuestionPatch {
                    text: Some("Capital of France?".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.text, "Capital of France?");
        assert_eq!(updated.answer, "Paris");
        assert_eq!(updated.order, 2);
        assert_eq!(updated.game_id, game.id);
    }

    #[tokio::test]
    async fn game_questions_are_ordered_by_round_then_position() {
        let (store, game) = store_with_game().await;
        let rounds = store.list_rounds(game.id).await.unwrap();

        let late = store
            .create_question(new_question(rounds[1].id, 1, "b"))
            .await
            .unwrap();
        let second = store
            .create_question(new_question(rounds[0].id, 2, "a2"))
            .await
            .unwrap();
        let first = store
            .create_question(new_question(rounds[0].id, 1, "a1"))
            .await
            .unwrap();

        let ids: Vec<_> = store
            .list_game_questions(game.id)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id, late.id]);

        let round_ids: Vec<_> = store
            .list_round_questions(rounds[0].id)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(round_ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn submission_rows_are_scoped_to_the_game() {
        let (store, game) = store_with_game().await;
        let other = store
            .create_game(NewGame {
                title: "Other".into(),
            })
            .await
            .unwrap();
        let round = store.list_rounds(game.id).await.unwrap()[0].clone();
        let other_round = store.list_rounds(other.id).await.unwrap()[0].clone();
        let question = store
            .create_question(new_question(round.id, 1, "a"))
            .await
            .unwrap();
        let other_question = store
            .create_question(new_question(other_round.id, 1, "b"))
            .await
            .unwrap();
        let team = store
            .create_team(NewTeam {
                name: "Quizzly Bears".into(),
            })
            .await
            .unwrap();

        for (question_id, is_correct) in [(question.id, true), (other_question.id, true), (999, true)]
        {
            store
                .record_submission(NewAnswerSubmission {
                    question_id,
                    team_id: team.id,
                    answer_text: "a".into(),
                    is_correct,
                })
                .await
                .unwrap();
        }

        let rows = store.list_submission_rows(game.id).await.unwrap();
        assert_eq!(
            rows,
            vec![SubmissionRow {
                team_id: team.id,
                team_name: "Quizzly Bears".into(),
                is_correct: true,
            }]
        );
    }
}
