use std::{collections::HashMap, sync::Arc};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{DateTime, Document, doc},
    options::{IndexOptions, ReturnDocument},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::info;

use super::{
    config::MongoConfig,
    connection,
    error::{MongoDaoError, MongoResult},
    models::{
        COUNTER_COLLECTION, CounterDocument, GAME_COLLECTION, MongoGameDocument,
        MongoQuestionDocument, MongoRoundDocument, MongoSubmissionDocument, MongoTeamDocument,
        MongoUserDocument, QUESTION_COLLECTION, ROUND_COLLECTION, SUBMISSION_COLLECTION,
        TEAM_COLLECTION, USER_COLLECTION, doc_id,
    },
};
use crate::{
    dao::{
        entity_store::EntityStore,
        models::{
            AnswerSubmissionEntity, EntityId, GameEntity, NewAnswerSubmission, NewGame,
            NewQuestion, NewTeam, NewUser, QuestionEntity, QuestionPatch, ROUNDS_PER_GAME,
            RoundEntity, SubmissionRow, TeamEntity, UserEntity,
        },
        storage::{StorageError, StorageResult},
    },
    state::state_machine::GamePhase,
};

/// Entity store persisting every record type in its own MongoDB collection.
#[derive(Clone)]
pub struct MongoEntityStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    /// Swapped wholesale on reconnect; the handle keeps its client alive.
    database: RwLock<Database>,
    config: MongoConfig,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.database.read().await.clone();
        connection::ping(&database)
            .await
            .map_err(|source| MongoDaoError::Ping { source })
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database = connection::open(&self.config).await?;
        *self.database.write().await = database;
        info!(database = self.config.database_name(), "MongoDB connection re-established");
        Ok(())
    }
}

impl MongoEntityStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = connection::open(&config).await?;

        let inner = Arc::new(MongoInner {
            database: RwLock::new(database),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let indexes: [(&'static str, &'static str, Document); 4] = [
            (ROUND_COLLECTION, "game_id", doc! {"game_id": 1, "number": 1}),
            (QUESTION_COLLECTION, "round_id", doc! {"round_id": 1, "order": 1}),
            (
                QUESTION_COLLECTION,
                "game_id",
                doc! {"game_id": 1, "round_number": 1, "order": 1},
            ),
            (SUBMISSION_COLLECTION, "game_id", doc! {"game_id": 1}),
        ];

        let database = self.database().await;
        for (collection, index, keys) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(format!("{collection}_{index}_idx")))
                        .build(),
                )
                .build();

            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::Index {
                    collection,
                    index,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        self.inner.database.read().await.clone()
    }

    async fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.inner.database.read().await.collection::<T>(name)
    }

    /// Increment and return the id sequence of `collection`.
    async fn next_id(&self, collection: &'static str) -> MongoResult<EntityId> {
        let counters = self.collection::<CounterDocument>(COUNTER_COLLECTION).await;
        let counter = counters
            .find_one_and_update(doc! {"_id": collection}, doc! {"$inc": {"seq": 1_i64}})
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::Counter { collection, source })?
            .ok_or(MongoDaoError::MissingCounter { collection })?;
        Ok(counter.seq)
    }

    async fn find_many<T>(
        &self,
        collection: &'static str,
        filter: Document,
        sort: Document,
    ) -> MongoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync + Unpin,
    {
        self.collection::<T>(collection)
            .await
            .find(filter)
            .sort(sort)
            .await
            .map_err(MongoDaoError::query("find", collection))?
            .try_collect()
            .await
            .map_err(MongoDaoError::query("read cursor", collection))
    }

    async fn find_by_id<T>(&self, collection: &'static str, id: EntityId) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.collection::<T>(collection)
            .await
            .find_one(doc_id(id))
            .await
            .map_err(MongoDaoError::query("find by id", collection))
    }

    async fn insert<T>(&self, collection: &'static str, document: &T) -> MongoResult<()>
    where
        T: Serialize + Send + Sync,
    {
        self.collection::<T>(collection)
            .await
            .insert_one(document)
            .await
            .map_err(MongoDaoError::query("insert", collection))?;
        Ok(())
    }

    async fn create_game(&self, game: NewGame) -> StorageResult<GameEntity> {
        let game_id = self.next_id(GAME_COLLECTION).await?;

        let mut rounds = Vec::with_capacity(usize::from(ROUNDS_PER_GAME));
        for number in 1..=ROUNDS_PER_GAME {
            let id = self.next_id(ROUND_COLLECTION).await?;
            rounds.push(MongoRoundDocument::from(RoundEntity {
                id,
                game_id,
                number,
            }));
        }

        // Rounds go in first: readers only reach them through the game id, so the game
        // becomes visible with all six rounds already present.
        self.collection::<MongoRoundDocument>(ROUND_COLLECTION)
            .await
            .insert_many(&rounds)
            .await
            .map_err(MongoDaoError::query("insert", ROUND_COLLECTION))?;

        let now = std::time::SystemTime::now();
        let entity = GameEntity {
            id: game_id,
            title: game.title,
            phase: GamePhase::default(),
            current_question_id: None,
            created_at: now,
            updated_at: now,
        };
        self.insert(GAME_COLLECTION, &MongoGameDocument::from(entity.clone()))
            .await?;
        Ok(entity)
    }

    async fn update_game(&self, id: EntityId, set: Document) -> StorageResult<GameEntity> {
        let mut set = set;
        set.insert("updated_at", DateTime::now());
        let updated = self
            .collection::<MongoGameDocument>(GAME_COLLECTION)
            .await
            .find_one_and_update(doc_id(id), doc! {"$set": set})
            .return_document(ReturnDocument::After)
            .await
            .map_err(MongoDaoError::query("update", GAME_COLLECTION))?;

        updated
            .map(Into::into)
            .ok_or_else(|| StorageError::not_found("game", id))
    }

    async fn create_question(&self, question: NewQuestion) -> StorageResult<QuestionEntity> {
        let round: RoundEntity = self
            .find_by_id::<MongoRoundDocument>(ROUND_COLLECTION, question.round_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| StorageError::not_found("round", question.round_id))?;

        let entity = QuestionEntity {
            id: self.next_id(QUESTION_COLLECTION).await?,
            round_id: round.id,
            game_id: round.game_id,
            round_number: round.number,
            order: question.order,
            text: question.text,
            answer: question.answer,
            media_url: question.media_url,
        };
        self.insert(
            QUESTION_COLLECTION,
            &MongoQuestionDocument::from(entity.clone()),
        )
        .await?;
        Ok(entity)
    }

    async fn update_question(
        &self,
        id: EntityId,
        patch: QuestionPatch,
    ) -> StorageResult<QuestionEntity> {
        let collection = self
            .collection::<MongoQuestionDocument>(QUESTION_COLLECTION)
            .await;

        if patch.is_empty() {
            return collection
                .find_one(doc_id(id))
                .await
                .map_err(MongoDaoError::query("find by id", QUESTION_COLLECTION))?
                .map(Into::into)
                .ok_or_else(|| StorageError::not_found("question", id));
        }

        let mut set = Document::new();
        if let Some(text) = patch.text {
            set.insert("text", text);
        }
        if let Some(answer) = patch.answer {
            set.insert("answer", answer);
        }
        if let Some(media_url) = patch.media_url {
            set.insert("media_url", media_url);
        }
        if let Some(order) = patch.order {
            set.insert("order", i32::from(order));
        }

        collection
            .find_one_and_update(doc_id(id), doc! {"$set": set})
            .return_document(ReturnDocument::After)
            .await
            .map_err(MongoDaoError::query("update", QUESTION_COLLECTION))?
            .map(Into::into)
            .ok_or_else(|| StorageError::not_found("question", id))
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<UserEntity> {
        if let Some(team_id) = user.team_id {
            if self
                .find_by_id::<MongoTeamDocument>(TEAM_COLLECTION, team_id)
                .await?
                .is_none()
            {
                return Err(StorageError::not_found("team", team_id));
            }
        }

        let entity = UserEntity {
            id: self.next_id(USER_COLLECTION).await?,
            name: user.name,
            role: user.role,
            team_id: user.team_id,
        };
        self.insert(USER_COLLECTION, &MongoUserDocument::from(entity.clone()))
            .await?;
        Ok(entity)
    }

    async fn record_submission(
        &self,
        submission: NewAnswerSubmission,
    ) -> StorageResult<AnswerSubmissionEntity> {
        let game_id = self
            .find_by_id::<MongoQuestionDocument>(QUESTION_COLLECTION, submission.question_id)
            .await?
            .map(|question| QuestionEntity::from(question).game_id);

        let document = MongoSubmissionDocument {
            id: self.next_id(SUBMISSION_COLLECTION).await?,
            question_id: submission.question_id,
            game_id,
            team_id: submission.team_id,
            answer_text: submission.answer_text,
            is_correct: Some(submission.is_correct),
            submitted_at: DateTime::now(),
        };
        self.insert(SUBMISSION_COLLECTION, &document).await?;
        Ok(document.into())
    }

    async fn list_submission_rows(&self, game_id: EntityId) -> StorageResult<Vec<SubmissionRow>> {
        let submissions: Vec<MongoSubmissionDocument> = self
            .find_many(
                SUBMISSION_COLLECTION,
                doc! {"game_id": game_id},
                doc! {"_id": 1},
            )
            .await?;

        let mut team_ids: Vec<EntityId> = submissions.iter().map(|s| s.team_id).collect();
        team_ids.sort_unstable();
        team_ids.dedup();

        let teams: HashMap<EntityId, TeamEntity> = self
            .find_many::<MongoTeamDocument>(
                TEAM_COLLECTION,
                doc! {"_id": {"$in": team_ids}},
                doc! {"_id": 1},
            )
            .await?
            .into_iter()
            .map(|team| {
                let team = TeamEntity::from(team);
                (team.id, team)
            })
            .collect();

        Ok(submissions
            .into_iter()
            .filter_map(|submission| {
                let team = teams.get(&submission.team_id)?;
                Some(SubmissionRow {
                    team_id: team.id,
                    team_name: team.name.clone(),
                    is_correct: submission.is_correct.unwrap_or(false),
                })
            })
            .collect())
    }
}

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

impl EntityStore for MongoEntityStore {
    fn create_game(&self, game: NewGame) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_game(game).await })
    }

    fn find_game(&self, id: EntityId) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .find_by_id::<MongoGameDocument>(GAME_COLLECTION, id)
                .await?
                .map(Into::into))
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents: Vec<MongoGameDocument> = store
                .find_many(GAME_COLLECTION, doc! {}, doc! {"_id": 1})
                .await?;
            Ok(documents.into_iter().map(Into::into).collect())
        })
    }

    fn update_game_phase(
        &self,
        id: EntityId,
        phase: GamePhase,
    ) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(id, doc! {"phase": phase.as_str()})
                .await
        })
    }

    fn update_current_question(
        &self,
        id: EntityId,
        question_id: Option<EntityId>,
    ) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(id, doc! {"current_question_id": question_id})
                .await
        })
    }

    fn list_rounds(
        &self,
        game_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents: Vec<MongoRoundDocument> = store
                .find_many(
                    ROUND_COLLECTION,
                    doc! {"game_id": game_id},
                    doc! {"number": 1},
                )
                .await?;
            Ok(documents.into_iter().map(Into::into).collect())
        })
    }

    fn create_question(
        &self,
        question: NewQuestion,
    ) -> BoxFuture<'static, StorageResult<QuestionEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_question(question).await })
    }

    fn find_question(
        &self,
        id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .find_by_id::<MongoQuestionDocument>(QUESTION_COLLECTION, id)
                .await?
                .map(Into::into))
        })
    }

    fn update_question(
        &self,
        id: EntityId,
        patch: QuestionPatch,
    ) -> BoxFuture<'static, StorageResult<QuestionEntity>> {
        let store = self.clone();
        Box::pin(async move { store.update_question(id, patch).await })
    }

    fn list_round_questions(
        &self,
        round_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents: Vec<MongoQuestionDocument> = store
                .find_many(
                    QUESTION_COLLECTION,
                    doc! {"round_id": round_id},
                    doc! {"order": 1, "_id": 1},
                )
                .await?;
            Ok(documents.into_iter().map(Into::into).collect())
        })
    }

    fn list_game_questions(
        &self,
        game_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents: Vec<MongoQuestionDocument> = store
                .find_many(
                    QUESTION_COLLECTION,
                    doc! {"game_id": game_id},
                    doc! {"round_number": 1, "order": 1, "_id": 1},
                )
                .await?;
            Ok(documents.into_iter().map(Into::into).collect())
        })
    }

    fn create_team(&self, team: NewTeam) -> BoxFuture<'static, StorageResult<TeamEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let entity = TeamEntity {
                id: store.next_id(TEAM_COLLECTION).await?,
                name: team.name,
            };
            store
                .insert(TEAM_COLLECTION, &MongoTeamDocument::from(entity.clone()))
                .await?;
            Ok(entity)
        })
    }

    fn find_team(&self, id: EntityId) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .find_by_id::<MongoTeamDocument>(TEAM_COLLECTION, id)
                .await?
                .map(Into::into))
        })
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents: Vec<MongoTeamDocument> = store
                .find_many(TEAM_COLLECTION, doc! {}, doc! {"_id": 1})
                .await?;
            Ok(documents.into_iter().map(Into::into).collect())
        })
    }

    fn create_user(&self, user: NewUser) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_user(user).await })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents: Vec<MongoUserDocument> = store
                .find_many(USER_COLLECTION, doc! {}, doc! {"_id": 1})
                .await?;
            Ok(documents.into_iter().map(Into::into).collect())
        })
    }

    fn record_submission(
        &self,
        submission: NewAnswerSubmission,
    ) -> BoxFuture<'static, StorageResult<AnswerSubmissionEntity>> {
        let store = self.clone();
        Box::pin(async move { store.record_submission(submission).await })
    }

    fn list_submission_rows(
        &self,
        game_id: EntityId,
    ) -> BoxFuture<'static, StorageResult<Vec<SubmissionRow>>> {
        let store = self.clone();
        Box::pin(async move { store.list_submission_rows(game_id).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
