//! Trivia live backend entrypoint wiring REST, WebSocket, SSE and the storage backend.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_live_back::{
    config::{AppConfig, StoreBackend},
    dao::entity_store::InMemoryEntityStore,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let port = config.port();
    let backend = config.store().clone();
    let app_state = AppState::new(config);

    start_storage(&app_state, backend).await;
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the configured storage backend, supervising it in the background when remote.
async fn start_storage(state: &SharedState, backend: StoreBackend) {
    match backend {
        StoreBackend::Memory => {
            info!("using in-memory storage; data is lost on restart");
            state
                .install_entity_store(Arc::new(InMemoryEntityStore::new()))
                .await;
        }
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo { uri, database } => {
            use trivia_live_back::{
                dao::{
                    entity_store::{
                        EntityStore,
                        mongodb::{MongoConfig, MongoEntityStore},
                    },
                    storage::StorageError,
                },
                services::storage_supervisor,
            };

            info!(%uri, "using MongoDB storage");
            let connect = move || {
                let uri = uri.clone();
                let database = database.clone();
                async move {
                    let config = MongoConfig::from_uri(&uri, database.as_deref()).await?;
                    let store = MongoEntityStore::connect(config).await?;
                    Ok::<Arc<dyn EntityStore>, StorageError>(Arc::new(store))
                }
            };
            tokio::spawn(storage_supervisor::run(state.clone(), connect));
        }
        #[cfg(not(feature = "mongo-store"))]
        StoreBackend::Mongo { .. } => {
            warn!("MongoDB storage requested but the `mongo-store` feature is disabled; staying degraded");
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
