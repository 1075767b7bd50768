/// Live viewer registry.
pub mod hub;
/// Game phases and their order.
pub mod state_machine;
/// Phase and current-question changes with their broadcasts.
pub mod transitions;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::{
    config::AppConfig,
    dao::{entity_store::EntityStore, models::EntityId},
    error::ServiceError,
};

pub use self::hub::{BroadcastHub, ViewerKind};

/// Handle shared by every request handler and connection task.
pub type SharedState = Arc<AppState>;

/// Central application state storing the live viewer registry and the storage handle.
pub struct AppState {
    entity_store: RwLock<Option<Arc<dyn EntityStore>>>,
    hub: BroadcastHub,
    config: Arc<AppConfig>,
    /// One lock per game, held while its leaderboard is recomputed and broadcast.
    leaderboard_locks: DashMap<EntityId, Arc<Mutex<()>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            entity_store: RwLock::new(None),
            hub: BroadcastHub::default(),
            config: Arc::new(config),
            leaderboard_locks: DashMap::new(),
        })
    }

    /// Build a ready-to-use state around `store`, skipping degraded mode.
    pub async fn with_store(config: AppConfig, store: Arc<dyn EntityStore>) -> SharedState {
        let state = Self::new(config);
        state.install_entity_store(store).await;
        state
    }

    /// Obtain a handle to the current entity store, if one is installed.
    pub async fn entity_store(&self) -> Option<Arc<dyn EntityStore>> {
        let guard = self.entity_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current entity store, or [`ServiceError::Degraded`] while none is installed.
    pub async fn require_store(&self) -> Result<Arc<dyn EntityStore>, ServiceError> {
        self.entity_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new entity store implementation and leave degraded mode.
    pub async fn install_entity_store(&self, store: Arc<dyn EntityStore>) {
        let mut guard = self.entity_store.write().await;
        *guard = Some(store);
    }

    /// Remove the current entity store and enter degraded mode.
    pub async fn clear_entity_store(&self) {
        let mut guard = self.entity_store.write().await;
        guard.take();
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.entity_store.read().await;
        guard.is_none()
    }

    /// Registry of live viewers.
    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Serialize leaderboard publication for `game_id`.
    ///
    /// Under this guard, successive `leaderboard_update` events of a game cover a growing
    /// set of submissions.
    pub async fn lock_leaderboard(&self, game_id: EntityId) -> OwnedMutexGuard<()> {
        let lock = self
            .leaderboard_locks
            .entry(game_id)
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    /// Configuration the server was started with.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::entity_store::InMemoryEntityStore;

    #[tokio::test]
    async fn starts_degraded_until_store_installed() {
        let state = AppState::new(AppConfig::for_tests("token"));
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .install_entity_store(Arc::new(InMemoryEntityStore::default()))
            .await;
        assert!(!state.is_degraded().await);

        state.clear_entity_store().await;
        assert!(state.is_degraded().await);
    }
}
