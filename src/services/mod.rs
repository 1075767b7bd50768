/// Answer intake: grading, recording and leaderboard refresh.
pub mod answer_service;
/// Host credential gate.
pub mod auth;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game creation and lookup.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Typed live event fan-out.
pub mod live_events;
/// Question management and broadcast.
pub mod question_service;
/// Team and user registration.
pub mod roster_service;
/// Answer grading rule and leaderboard ranking.
pub mod scoring;
/// Server-Sent Events viewers.
pub mod sse_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
/// WebSocket viewer handling.
pub mod websocket_service;
