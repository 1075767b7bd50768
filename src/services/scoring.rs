//! Answer grading and leaderboard computation.

use indexmap::IndexMap;

use crate::{
    dao::models::{EntityId, SubmissionRow},
    dto::leaderboard::{Leaderboard, TeamStanding},
    error::ServiceError,
    state::SharedState,
};

/// Whether `submitted` matches `expected`, ignoring case and surrounding whitespace.
pub fn is_correct(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Rank teams by their number of correct submissions.
///
/// Every correct submission counts, including repeats on the same question. Teams are
/// ordered by points descending, then by id ascending. Teams without submissions do not
/// appear.
pub fn rank(game_id: EntityId, rows: impl IntoIterator<Item = SubmissionRow>) -> Leaderboard {
    let mut by_team: IndexMap<EntityId, TeamStanding> = IndexMap::new();
    for row in rows {
        let standing = by_team.entry(row.team_id).or_insert_with(|| TeamStanding {
            team_id: row.team_id,
            team_name: row.team_name,
            points: 0,
        });
        if row.is_correct {
            standing.points += 1;
        }
    }

    let mut standings: Vec<TeamStanding> = by_team.into_values().collect();
    standings.sort_by(|a, b| b.points.cmp(&a.points).then(a.team_id.cmp(&b.team_id)));
    Leaderboard { game_id, standings }
}

/// Compute the current leaderboard of a game from its submission history.
pub async fn leaderboard(state: &SharedState, game_id: EntityId) -> Result<Leaderboard, ServiceError> {
    let store = state.require_store().await?;
    if store.find_game(game_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("game `{game_id}` not found")));
    }
    let rows = store.list_submission_rows(game_id).await?;
    Ok(rank(game_id, rows))
}
