use tracing::info;

use crate::{
    dao::models::{EntityId, GameEntity, NewGame, RoundEntity},
    error::ServiceError,
    state::SharedState,
};

/// Create a game in the `gathering` phase together with its six rounds.
pub async fn create_game(state: &SharedState, title: String) -> Result<GameEntity, ServiceError> {
    let store = state.require_store().await?;
    let game = store
        .create_game(NewGame {
            title: title.trim().to_owned(),
        })
        .await?;
    info!(game_id = game.id, title = %game.title, "game created");
    Ok(game)
}

/// Every stored game.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_games().await?)
}

/// Game by id, or [`ServiceError::NotFound`].
pub async fn get_game(state: &SharedState, game_id: EntityId) -> Result<GameEntity, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` not found")))
}

/// Rounds of a game ordered by number.
pub async fn list_rounds(
    state: &SharedState,
    game_id: EntityId,
) -> Result<Vec<RoundEntity>, ServiceError> {
    let game = get_game(state, game_id).await?;
    let store = state.require_store().await?;
    Ok(store.list_rounds(game.id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppState, state_machine::GamePhase, test_support::memory_state};

    #[tokio::test]
    async fn new_game_gathers_with_six_rounds() {
        let state = memory_state().await;
        let game = create_game(&state, "  Friday quiz ".into()).await.unwrap();
        assert_eq!(game.title, "Friday quiz");
        assert_eq!(game.phase, GamePhase::Gathering);
        assert_eq!(game.current_question_id, None);

        let numbers: Vec<u8> = list_rounds(&state, game.id)
            .await
            .unwrap()
            .iter()
            .map(|round| round.number)
            .collect();
        assert_eq!(numbers, [1, 2, 3, 4, 5, 6]);
        assert_eq!(list_games(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_game_is_not_found() {
        let state = memory_state().await;
        assert!(matches!(
            get_game(&state, 77).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            list_rounds(&state, 77).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn degraded_state_rejects_calls() {
        let state = AppState::new(crate::config::AppConfig::for_tests("token"));
        assert!(matches!(
            list_games(&state).await,
            Err(ServiceError::Degraded)
        ));
    }
}
