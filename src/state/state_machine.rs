use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Phases a game moves through, in their declared order.
///
/// Any phase may be written over any other through `set_phase`; the order only matters
/// for [`GamePhase::next`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum GamePhase {
    /// Players are joining and forming teams.
    #[default]
    #[serde(rename = "gathering")]
    Gathering,
    /// Questions of the first half are being asked.
    #[serde(rename = "questions_phase_1")]
    QuestionsPhase1,
    /// Answers of the first half are revealed.
    #[serde(rename = "answers_phase_1")]
    AnswersPhase1,
    /// Standings after the first half.
    #[serde(rename = "leaderboard_phase_1")]
    LeaderboardPhase1,
    /// Questions of the second half are being asked.
    #[serde(rename = "questions_phase_2")]
    QuestionsPhase2,
    /// Answers of the second half are revealed.
    #[serde(rename = "answers_phase_2")]
    AnswersPhase2,
    /// Final standings.
    #[serde(rename = "leaderboard_phase_2")]
    LeaderboardPhase2,
    /// The game is over.
    #[serde(rename = "finished")]
    Finished,
}

impl GamePhase {
    /// Every phase in declared order.
    pub const ALL: [GamePhase; 8] = [
        GamePhase::Gathering,
        GamePhase::QuestionsPhase1,
        GamePhase::AnswersPhase1,
        GamePhase::LeaderboardPhase1,
        GamePhase::QuestionsPhase2,
        GamePhase::AnswersPhase2,
        GamePhase::LeaderboardPhase2,
        GamePhase::Finished,
    ];

    /// Position of the phase inside [`GamePhase::ALL`].
    pub fn ordinal(self) -> usize {
        match self {
            GamePhase::Gathering => 0,
            GamePhase::QuestionsPhase1 => 1,
            GamePhase::AnswersPhase1 => 2,
            GamePhase::LeaderboardPhase1 => 3,
            GamePhase::QuestionsPhase2 => 4,
            GamePhase::AnswersPhase2 => 5,
            GamePhase::LeaderboardPhase2 => 6,
            GamePhase::Finished => 7,
        }
    }

    /// Phase following `self`, or `None` once the game is finished.
    pub fn next(self) -> Option<GamePhase> {
        Self::ALL.get(self.ordinal() + 1).copied()
    }

    /// Wire name of the phase, identical to its serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Gathering => "gathering",
            GamePhase::QuestionsPhase1 => "questions_phase_1",
            GamePhase::AnswersPhase1 => "answers_phase_1",
            GamePhase::LeaderboardPhase1 => "leaderboard_phase_1",
            GamePhase::QuestionsPhase2 => "questions_phase_2",
            GamePhase::AnswersPhase2 => "answers_phase_2",
            GamePhase::LeaderboardPhase2 => "leaderboard_phase_2",
            GamePhase::Finished => "finished",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_follow_declared_order() {
        let mut phase = GamePhase::default();
        let mut visited = vec![phase];
        while let Some(next) = phase.next() {
            visited.push(next);
            phase = next;
        }
        assert_eq!(visited, GamePhase::ALL);
        assert_eq!(phase, GamePhase::Finished);
    }

    #[test]
    fn ordinal_matches_position() {
        for (index, phase) in GamePhase::ALL.iter().enumerate() {
            assert_eq!(phase.ordinal(), index);
        }
    }

    #[test]
    fn wire_name_matches_serde() {
        for phase in GamePhase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
            let back: GamePhase = serde_json::from_str(&json).unwrap();
            assert_eq!(back, phase);
        }
    }

    #[test]
    fn rejects_unknown_phase() {
        assert!(serde_json::from_str::<GamePhase>("\"halftime\"").is_err());
        assert!(serde_json::from_str::<GamePhase>("\"questions_phase1\"").is_err());
    }
}
