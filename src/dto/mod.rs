use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Answer submission payloads.
pub mod answer;
/// Game, round and phase payloads.
pub mod game;
/// Health report.
pub mod health;
/// Leaderboard standings.
pub mod leaderboard;
/// Live events pushed to viewers.
pub mod live;
/// Question payloads, public and host views.
pub mod question;
/// Team payloads.
pub mod team;
/// User payloads.
pub mod user;
/// Shared validation rules.
pub mod validation;

pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
