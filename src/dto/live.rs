//! Live protocol shared by WebSocket and SSE viewers.
//!
//! Every server message is a JSON object tagged by `type`. Viewers may send short chat-like
//! messages back over the WebSocket; they are relayed to everybody as `message` events.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::EntityId,
    dto::{leaderboard::Leaderboard, question::QuestionBroadcast},
    state::state_machine::GamePhase,
};

/// Longest relayed viewer message, in characters.
pub const MAX_VIEWER_MESSAGE_CHARS: usize = 500;

/// Identifier handed to every live viewer when it connects.
pub type ViewerId = uuid::Uuid;

/// Event pushed to live viewers.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// Handshake sent to a viewer before it starts receiving broadcasts.
    Connected(ConnectedEvent),
    /// A game changed phase.
    PhaseUpdate(PhaseUpdateEvent),
    /// Standings recomputed after a submission.
    LeaderboardUpdate(Leaderboard),
    /// The host put a question on screen.
    Question(QuestionBroadcast),
    /// Text relayed from a viewer.
    Message(ViewerMessageEvent),
}

impl LiveEvent {
    /// Name of the event, identical to its `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::Connected(_) => "connected",
            LiveEvent::PhaseUpdate(_) => "phase_update",
            LiveEvent::LeaderboardUpdate(_) => "leaderboard_update",
            LiveEvent::Question(_) => "question",
            LiveEvent::Message(_) => "message",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
/// Handshake sent to a viewer before it joins the broadcast set.
pub struct ConnectedEvent {
    #[schema(value_type = String)]
    /// Identifier assigned to the viewer.
    pub viewer_id: ViewerId,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
/// Payload of a `phase_update` event.
pub struct PhaseUpdateEvent {
    /// Game whose phase changed.
    pub game_id: EntityId,
    /// New phase.
    pub phase: GamePhase,
    /// RFC 3339 timestamp of the change.
    pub changed_at: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
/// Text relayed from one viewer to all of them.
pub struct ViewerMessageEvent {
    #[schema(value_type = String)]
    /// Sender.
    pub viewer_id: ViewerId,
    /// Trimmed text, at most 500 characters.
    pub text: String,
}

/// Serialized event ready to be written to any number of viewers.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// SSE event name, equal to the `type` tag.
    pub event: &'static str,
    /// Serialized JSON payload shared by every recipient.
    pub data: Arc<str>,
}

impl ServerEvent {
    /// Serialize `event` once so it can be shared between viewers.
    pub fn from_live(event: &LiveEvent) -> serde_json::Result<Self> {
        Ok(Self {
            event: event.name(),
            data: serde_json::to_string(event)?.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ViewerInboundMessage {
    Message { text: String },
}

/// Extract the text to relay from a raw viewer frame.
///
/// Accepts `{"type":"message","text":...}` or plain text. Other JSON objects are ignored.
/// The text is trimmed and truncated to [`MAX_VIEWER_MESSAGE_CHARS`]; blank messages
/// yield `None`.
pub fn parse_viewer_message(raw: &str) -> Option<String> {
    let text = match serde_json::from_str::<ViewerInboundMessage>(raw) {
        Ok(ViewerInboundMessage::Message { text }) => text,
        Err(_) => {
            if matches!(
                serde_json::from_str::<serde_json::Value>(raw),
                Ok(serde_json::Value::Object(_))
            ) {
                return None;
            }
            raw.to_owned()
        }
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_VIEWER_MESSAGE_CHARS).collect())
}
