use serde::Serialize;
use utoipa::ToSchema;

/// Health report returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when a storage backend answers, `degraded` otherwise.
    pub status: &'static str,
    /// Number of live viewers currently registered.
    pub viewers: usize,
}

impl HealthResponse {
    /// Report for a server with a reachable store.
    pub fn ok(viewers: usize) -> Self {
        Self {
            status: "ok",
            viewers,
        }
    }

    /// Report for a server running without storage.
    pub fn degraded(viewers: usize) -> Self {
        Self {
            status: "degraded",
            viewers,
        }
    }

    /// Whether the report describes degraded mode.
    pub fn is_degraded(&self) -> bool {
        self.status == "degraded"
    }
}
