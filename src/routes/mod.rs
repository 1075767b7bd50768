use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    services::auth::{self, HOST_TOKEN_HEADER},
    state::SharedState,
};

/// `/answers`.
pub mod answers;
/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// `/games` and their rounds, phases, questions and leaderboard.
pub mod games;
/// `/healthcheck`.
pub mod health;
/// `/questions`.
pub mod questions;
/// `/rounds`.
pub mod rounds;
/// `/sse` live stream.
pub mod sse;
/// `/teams`.
pub mod teams;
/// `/users`.
pub mod users;
/// `/ws` live socket.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(games::router(state.clone()))
        .merge(questions::router(state.clone()))
        .merge(rounds::router())
        .merge(teams::router())
        .merge(users::router())
        .merge(answers::router())
        .merge(sse::router())
        .merge(websocket::router())
        .merge(docs::router());

    api_router.with_state(state)
}

/// Reject requests whose `X-Host-Token` header does not match the configured secret.
pub(crate) async fn require_host_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(HOST_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    auth::verify_host_token(&state, provided)?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        dao::models::{NewGame, NewQuestion, QuestionEntity},
        state::test_support::memory_state,
    };

    const TOKEN: &str = "test-host-token";

    async fn seeded() -> (SharedState, QuestionEntity) {
        let state = memory_state().await;
        let store = state.require_store().await.unwrap();
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
                answer: "Paris".into(),
                media_url: None,
            })
            .await
            .unwrap();
        (state, question)
    }

    fn request(method: Method, uri: String, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header(HOST_TOKEN_HEADER, token);
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    async fn json_body(res: Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn host_routes_reject_missing_or_wrong_token() {
        let (state, question) = seeded().await;
        let id = question.id;
        let cases = [
            (Method::PUT, format!("/questions/{id}"), r#"{"answer":"Lyon"}"#),
            (Method::POST, format!("/questions/{id}/broadcast"), ""),
            (
                Method::POST,
                "/questions".to_owned(),
                r#"{"round_id":1,"order":2,"text":"2+2?","answer":"4"}"#,
            ),
            (
                Method::POST,
                format!("/games/{}/phase/advance", question.game_id),
                "",
            ),
        ];

        for (method, uri, body) in cases {
            for token in [None, Some("wrong")] {
                let res = router(state.clone())
                    .oneshot(request(method.clone(), uri.clone(), token, body))
                    .await
                    .unwrap();
                assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            }
        }

        let stored = state
            .require_store()
            .await
            .unwrap()
            .find_question(id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.answer, "Paris");
    }

    #[tokio::test]
    async fn question_reads_stay_open_and_host_token_unlocks_writes() {
        let (state, question) = seeded().await;
        let id = question.id;

        let res = router(state.clone())
            .oneshot(request(Method::GET, format!("/questions/{id}"), None, ""))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["id"], id);
        assert!(body.get("answer").is_none());

        let res = router(state.clone())
            .oneshot(request(
                Method::PUT,
                format!("/questions/{id}"),
                Some(TOKEN),
                r#"{"answer":"Lyon"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["answer"], "Lyon");

        let res = router(state)
            .oneshot(request(
                Method::POST,
                format!("/questions/{id}/broadcast"),
                Some(TOKEN),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["game_id"], question.game_id);
        assert!(body["question"].get("answer").is_none());
    }
}
