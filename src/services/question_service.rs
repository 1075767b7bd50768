use tracing::info;

use crate::{
    dao::models::{EntityId, NewQuestion, QuestionEntity, QuestionPatch},
    dto::question::QuestionBroadcast,
    error::ServiceError,
    services::live_events,
    state::{SharedState, transitions},
};

/// Store a question in its round; fails with `NotFound` for an unknown round.
pub async fn create_question(
    state: &SharedState,
    question: NewQuestion,
) -> Result<QuestionEntity, ServiceError> {
    let store = state.require_store().await?;
    let question = store.create_question(question).await?;
    info!(
        question_id = question.id,
        round_id = question.round_id,
        game_id = question.game_id,
        "question created"
    );
    Ok(question)
}

/// Question by id, including its answer.
pub async fn get_question(
    state: &SharedState,
    question_id: EntityId,
) -> Result<QuestionEntity, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_question(question_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("question `{question_id}` not found")))
}

/// Apply a partial update; fields left as `None` keep their stored value.
pub async fn update_question(
    state: &SharedState,
    question_id: EntityId,
    patch: QuestionPatch,
) -> Result<QuestionEntity, ServiceError> {
    let store = state.require_store().await?;
    let question = store.update_question(question_id, patch).await?;
    info!(question_id, "question updated");
    Ok(question)
}

/// Questions of a round ordered by position; empty for an unknown round.
pub async fn list_round_questions(
    state: &SharedState,
    round_id: EntityId,
) -> Result<Vec<QuestionEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_round_questions(round_id).await?)
}

/// Questions of a game ordered by round then position.
pub async fn list_game_questions(
    state: &SharedState,
    game_id: EntityId,
) -> Result<Vec<QuestionEntity>, ServiceError> {
    let store = state.require_store().await?;
    if store.find_game(game_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("game `{game_id}` not found")));
    }
    Ok(store.list_game_questions(game_id).await?)
}

/// Make a question the current one of its game and push it to every viewer.
///
/// The broadcast payload never contains the answer.
pub async fn broadcast_question(
    state: &SharedState,
    question_id: EntityId,
) -> Result<QuestionBroadcast, ServiceError> {
    let question = get_question(state, question_id).await?;
    transitions::set_current_question(state, question.game_id, &question).await?;

    let payload = QuestionBroadcast::from(question);
    live_events::broadcast_question(state, payload.clone());
    Ok(payload)
}

/// Question currently pointed at by a game, for viewers joining late.
pub async fn current_question(
    state: &SharedState,
    game_id: EntityId,
) -> Result<Option<QuestionBroadcast>, ServiceError> {
    let store = state.require_store().await?;
    let game = store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` not found")))?;

    let Some(question_id) = game.current_question_id else {
        return Ok(None);
    };
    Ok(store.find_question(question_id).await?.map(Into::into))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::models::NewGame,
        state::{ViewerKind, test_support::memory_state},
    };

    async fn seeded() -> (SharedState, QuestionEntity) {
        let state = memory_state().await;
        let store = state.require_store().await.unwrap();
        let game = store
            .create_game(NewGame {
                title: "Quiz".into(),
            })
            .await
            .unwrap();
        let round = store.list_rounds(game.id).await.unwrap().remove(2);
        let question = create_question(
            &state,
            NewQuestion {
                round_id: round.id,
                order: 4,
                text: "Tallest mountain?".into(),
                answer: "Everest".into(),
                media_url: Some("/media/peak.jpg".into()),
            },
        )
        .await
        .unwrap();
        (state, question)
    }

    #[tokio::test]
    async fn broadcast_sets_pointer_and_hides_answer() {
        let (state, question) = seeded().await;
        let (tx, mut rx) = state.hub().viewer_channel();
        state.hub().connect(ViewerKind::WebSocket, tx).unwrap();
        rx.try_recv().unwrap();

        let payload = broadcast_question(&state, question.id).await.unwrap();
        assert_eq!(payload.game_id, question.game_id);
        assert_eq!(payload.round_number, 3);
        assert_eq!(payload.question.order, 4);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event, "question");
        assert!(!event.data.contains("Everest"));
        assert!(!event.data.contains("answer"));

        let current = current_question(&state, question.game_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current, payload);
    }

    #[tokio::test]
    async fn current_question_is_none_before_broadcast() {
        let (state, question) = seeded().await;
        assert!(
            current_question(&state, question.game_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn broadcasting_unknown_question_is_not_found() {
        let (state, _) = seeded().await;
        let err = broadcast_question(&state, 12345).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (state, question) = seeded().await;
        let updated = update_question(
            &state,
            question.id,
            QuestionPatch {
                text: Some("Highest mountain?".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.text, "Highest mountain?");
        assert_eq!(updated.answer, "Everest");
        assert_eq!(updated.media_url.as_deref(), Some("/media/peak.jpg"));
        assert_eq!(updated.order, 4);
    }
}
