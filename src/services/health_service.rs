use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the storage backend and report the current mode with the live viewer count.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    let viewers = state.hub().viewer_count();
    if state.is_degraded().await {
        HealthResponse::degraded(viewers)
    } else {
        HealthResponse::ok(viewers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        state::{AppState, test_support::memory_state},
    };

    #[tokio::test]
    async fn reports_mode() {
        let state = memory_state().await;
        assert_eq!(health_status(&state).await.status, "ok");

        let degraded = AppState::new(AppConfig::for_tests("token"));
        let report = health_status(&degraded).await;
        assert_eq!(report.status, "degraded");
        assert_eq!(report.viewers, 0);
    }
}
