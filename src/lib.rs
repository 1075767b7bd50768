//! Library crate for trivia-live-back, exposing modules for binaries and integration tests.

/// Runtime configuration.
pub mod config;
/// Persistence layer.
pub mod dao;
/// Wire types.
pub mod dto;
/// Service and HTTP errors.
pub mod error;
/// HTTP, WebSocket and SSE routes.
pub mod routes;
/// Business logic.
pub mod services;
/// Shared state, broadcast hub and game state machine.
pub mod state;
