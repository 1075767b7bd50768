//! Phase and current-question mutations. Every change is persisted before it is broadcast.

use tracing::info;

use crate::{
    dao::models::{EntityId, GameEntity, QuestionEntity},
    error::ServiceError,
    services::live_events,
    state::{SharedState, state_machine::GamePhase},
};

/// Overwrite the phase of a game and notify viewers.
///
/// No ordering is enforced: any phase may follow any other, and writing the current
/// phase again is accepted and broadcast again.
pub async fn set_phase(
    state: &SharedState,
    game_id: EntityId,
    phase: GamePhase,
) -> Result<GameEntity, ServiceError> {
    let store = state.require_store().await?;
    let game = store.update_game_phase(game_id, phase).await?;
    info!(game_id, phase = %game.phase, "game phase updated");
    live_events::broadcast_phase_update(state, &game);
    Ok(game)
}

/// Move a game to the phase following its current one.
pub async fn advance_phase(
    state: &SharedState,
    game_id: EntityId,
) -> Result<GameEntity, ServiceError> {
    let store = state.require_store().await?;
    let game = store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` not found")))?;

    let next = game.phase.next().ok_or_else(|| {
        ServiceError::InvalidState(format!("game `{game_id}` is already finished"))
    })?;
    set_phase(state, game_id, next).await
}

/// Point a game at one of its questions.
///
/// Fails with [`ServiceError::InvalidInput`] when the question belongs to another game.
pub async fn set_current_question(
    state: &SharedState,
    game_id: EntityId,
    question: &QuestionEntity,
) -> Result<GameEntity, ServiceError> {
    if question.game_id != game_id {
        return Err(ServiceError::InvalidInput(format!(
            "question `{}` does not belong to game `{game_id}`",
            question.id
        )));
    }

    let store = state.require_store().await?;
    let game = store
        .update_current_question(game_id, Some(question.id))
        .await?;
    info!(game_id, question_id = question.id, "current question updated");
    Ok(game)
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::Receiver;

    use super::*;
    use crate::{
        dao::models::{NewGame, NewQuestion},
        dto::live::ServerEvent,
        state::{ViewerKind, test_support::memory_state},
    };

    fn drain(rx: &mut Receiver<ServerEvent>) -> Vec<serde_json::Value> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(serde_json::from_str(&event.data).unwrap());
        }
        events
    }

    #[tokio::test]
    async fn set_phase_persists_and_broadcasts() {
        let state = memory_state().await;
        let store = state.require_store().await.unwrap();
        let game = store
            .create_game(NewGame {
                title: "Quiz".into(),
            })
            .await
            .unwrap();

        let (tx, mut rx) = state.hub().viewer_channel();
        state.hub().connect(ViewerKind::WebSocket, tx).unwrap();

        for phase in [GamePhase::Finished, GamePhase::Gathering, GamePhase::Gathering] {
            let updated = set_phase(&state, game.id, phase).await.unwrap();
            assert_eq!(updated.phase, phase);
            let stored = store.find_game(game.id).await.unwrap().unwrap();
            assert_eq!(stored.phase, phase);
        }

        let events = drain(&mut rx);
        assert_eq!(events[0]["type"], "connected");
        let phases: Vec<_> = events[1..]
            .iter()
            .map(|event| {
                assert_eq!(event["type"], "phase_update");
                assert_eq!(event["game_id"], game.id);
                assert!(event["changed_at"].is_string());
                event["phase"].as_str().unwrap().to_owned()
            })
            .collect();
        assert_eq!(phases, ["finished", "gathering", "gathering"]);
    }

    #[tokio::test]
    async fn set_phase_on_unknown_game_is_not_found() {
        let state = memory_state().await;
        let err = set_phase(&state, 404, GamePhase::Finished).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn advance_walks_declared_order_then_stops() {
        let state = memory_state().await;
        let store = state.require_store().await.unwrap();
        let game = store
            .create_game(NewGame {
                title: "Quiz".into(),
            })
            .await
            .unwrap();

        for expected in &GamePhase::ALL[1..] {
            let game = advance_phase(&state, game.id).await.unwrap();
            assert_eq!(game.phase, *expected);
        }
        let err = advance_phase(&state, game.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn current_question_must_belong_to_game() {
        let state = memory_state().await;
        let store = state.require_store().await.unwrap();
        let first = store
            .create_game(NewGame { title: "A".into() })
            .await
            .unwrap();
        let second = store
            .create_game(NewGame { title: "B".into() })
            .await
            .unwrap();
        let round = store.list_rounds(first.id).await.unwrap()[0].clone();
        let question = store
            .create_question(NewQuestion {
                round_id: round.id,
                order: 1,
                text: "Capital of France?".into(),
                answer: "Paris".into(),
                media_url: None,
            })
            .await
            .unwrap();

        let err = set_current_question(&state, second.id, &question)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let game = set_current_question(&state, first.id, &question)
            .await
            .unwrap();
        assert_eq!(game.current_question_id, Some(question.id));
    }
}
