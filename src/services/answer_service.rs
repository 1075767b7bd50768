use tracing::{info, warn};

use crate::{
    dao::models::{AnswerSubmissionEntity, EntityId, NewAnswerSubmission},
    error::ServiceError,
    services::{live_events, scoring},
    state::SharedState,
};

/// Grade and record a team's answer, then push the refreshed leaderboard.
///
/// A submission for an unknown question is kept and graded incorrect; no leaderboard is
/// broadcast for it since it belongs to no game.
pub async fn submit_answer(
    state: &SharedState,
    question_id: EntityId,
    team_id: EntityId,
    answer_text: String,
) -> Result<AnswerSubmissionEntity, ServiceError> {
    let store = state.require_store().await?;

    if store.find_team(team_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("team `{team_id}` not found")));
    }

    let question = store.find_question(question_id).await?;
    let is_correct = question
        .as_ref()
        .is_some_and(|question| scoring::is_correct(&answer_text, &question.answer));

    let submission = store
        .record_submission(NewAnswerSubmission {
            question_id,
            team_id,
            answer_text,
            is_correct,
        })
        .await?;
    info!(
        submission_id = submission.id,
        question_id, team_id, is_correct, "answer recorded"
    );

    match question {
        Some(question) => {
            let _guard = state.lock_leaderboard(question.game_id).await;
            let leaderboard = scoring::leaderboard(state, question.game_id).await?;
            live_events::broadcast_leaderboard(state, leaderboard);
        }
        None => warn!(
            question_id,
            team_id, "answer submitted for unknown question; graded incorrect"
        ),
    }

    Ok(submission)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::{
            entity_store::EntityStore,
            models::{NewGame, NewQuestion, NewTeam, QuestionEntity, TeamEntity},
        },
        state::{ViewerKind, test_support::memory_state},
    };

    async fn seed(
        store: &Arc<dyn EntityStore>,
        teams: usize,
    ) -> (QuestionEntity, Vec<TeamEntity>) {
        let game = store
            .create_game(NewGame {
                title: "Quiz".into(),
            })
            .await
            .unwrap();
        let round = store.list_rounds(game.id).await.unwrap().remove(0);
        let question = store
            .create_question(NewQuestion {
                round_id: round.id,
                order: 1,
                text: "Capital of France?".into(),
                answer: " paris ".into(),
                media_url: None,
            })
            .await
            .unwrap();
        let mut created = Vec::new();
        for index in 0..teams {
            created.push(
                store
                    .create_team(NewTeam {
                        name: format!("Team {index}"),
                    })
                    .await
                    .unwrap(),
            );
        }
        (question, created)
    }

    #[tokio::test]
    async fn grades_and_broadcasts_leaderboard() {
        let state = memory_state().await;
        let store = state.require_store().await.unwrap();
        let (question, teams) = seed(&store, 2).await;
        let (tx, mut rx) = state.hub().viewer_channel();
        state.hub().connect(ViewerKind::Sse, tx).unwrap();
        rx.try_recv().unwrap();

        let a = submit_answer(&state, question.id, teams[0].id, "Paris".into())
            .await
            .unwrap();
        let b = submit_answer(&state, question.id, teams[1].id, "London".into())
            .await
            .unwrap();
        assert_eq!(a.is_correct, Some(true));
        assert_eq!(b.is_correct, Some(false));

        rx.try_recv().unwrap();
        let last: serde_json::Value =
            serde_json::from_str(&rx.try_recv().unwrap().data).unwrap();
        assert_eq!(last["type"], "leaderboard_update");
        assert_eq!(last["game_id"], question.game_id);
        assert_eq!(last["standings"][0]["team_id"], teams[0].id);
        assert_eq!(last["standings"][0]["points"], 1);
        assert_eq!(last["standings"][1]["team_id"], teams[1].id);
        assert_eq!(last["standings"][1]["points"], 0);
    }

    #[tokio::test]
    async fn unknown_question_is_recorded_as_incorrect() {
        let state = memory_state().await;
        let store = state.require_store().await.unwrap();
        let (_, teams) = seed(&store, 1).await;
        let (tx, mut rx) = state.hub().viewer_channel();
        state.hub().connect(ViewerKind::WebSocket, tx).unwrap();
        rx.try_recv().unwrap();

        let submission = submit_answer(&state, 999, teams[0].id, "Paris".into())
            .await
            .unwrap();
        assert_eq!(submission.is_correct, Some(false));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let state = memory_state().await;
        let store = state.require_store().await.unwrap();
        let (question, _) = seed(&store, 0).await;
        let err = submit_answer(&state, question.id, 42, "Paris".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_are_all_counted() {
        let state = memory_state().await;
        let store = state.require_store().await.unwrap();
        let (question, teams) = seed(&store, 8).await;

        let mut handles = Vec::new();
        for (index, team) in teams.iter().enumerate() {
            let state = state.clone();
            let question_id = question.id;
            let team_id = team.id;
            let answer = if index % 2 == 0 { "PARIS" } else { "Lyon" };
            handles.push(tokio::spawn(async move {
                submit_answer(&state, question_id, team_id, answer.into()).await
            }));
        }

        let mut correct = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_correct == Some(true) {
                correct += 1;
            }
        }

        let board = scoring::leaderboard(&state, question.game_id).await.unwrap();
        assert_eq!(board.standings.len(), teams.len());
        let total: u32 = board.standings.iter().map(|s| s.points).sum();
        assert_eq!(total, correct);
        assert_eq!(correct, 4);
        let mut ids: Vec<_> = board.standings.iter().map(|s| s.team_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), teams.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn last_leaderboard_update_counts_every_submission() {
        for _ in 0..10 {
            let state = memory_state().await;
            let store = state.require_store().await.unwrap();
            let (question, teams) = seed(&store, 16).await;
            let (tx, mut rx) = state.hub().viewer_channel();
            state.hub().connect(ViewerKind::Sse, tx).unwrap();
            rx.try_recv().unwrap();

            let mut handles = Vec::new();
            for team in &teams {
                let state = state.clone();
                let (question_id, team_id) = (question.id, team.id);
                handles.push(tokio::spawn(async move {
                    submit_answer(&state, question_id, team_id, "Paris".into()).await
                }));
            }
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            let mut last = None;
            while let Ok(event) = rx.try_recv() {
                last = Some(serde_json::from_str::<serde_json::Value>(&event.data).unwrap());
            }
            let last = last.unwrap();
            assert_eq!(last["type"], "leaderboard_update");
            let total: u64 = last["standings"]
                .as_array()
                .unwrap()
                .iter()
                .map(|standing| standing["points"].as_u64().unwrap())
                .sum();
            assert_eq!(total, teams.len() as u64);
        }
    }
}
