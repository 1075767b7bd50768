use tracing::debug;

use crate::{
    dao::models::GameEntity,
    dto::{
        format_system_time,
        leaderboard::Leaderboard,
        live::{LiveEvent, PhaseUpdateEvent, ViewerId, ViewerMessageEvent},
        question::QuestionBroadcast,
    },
    state::SharedState,
};

/// Broadcast the phase a game just entered.
pub fn broadcast_phase_update(state: &SharedState, game: &GameEntity) {
    let event = LiveEvent::PhaseUpdate(PhaseUpdateEvent {
        game_id: game.id,
        phase: game.phase,
        changed_at: format_system_time(game.updated_at),
    });
    send(state, &event);
}

/// Broadcast the complete standings of a game.
pub fn broadcast_leaderboard(state: &SharedState, leaderboard: Leaderboard) {
    send(state, &LiveEvent::LeaderboardUpdate(leaderboard));
}

/// Broadcast the question the host just put on screen.
pub fn broadcast_question(state: &SharedState, question: QuestionBroadcast) {
    send(state, &LiveEvent::Question(question));
}

/// Relay a viewer's text to every viewer, sender included.
pub fn broadcast_viewer_message(state: &SharedState, viewer_id: ViewerId, text: String) {
    send(
        state,
        &LiveEvent::Message(ViewerMessageEvent { viewer_id, text }),
    );
}

fn send(state: &SharedState, event: &LiveEvent) {
    let delivered = state.hub().broadcast(event);
    debug!(event = event.name(), delivered, "live event broadcast");
}
