//! Team Bingo Back binary entrypoint wiring REST, SSE and the document store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use team_bingo_back::{
    build_router,
    config::{AppConfig, StoreBackend},
    dao::bingo_store::{BingoStore, memory::MemoryBingoStore},
    services::storage_supervisor,
    state::{AppState, SharedState},
};
#[cfg(any(feature = "mongo-store", feature = "couch-store"))]
use team_bingo_back::dao::storage::StorageError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    spawn_storage_supervisor(app_state.clone());
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Start the background task that connects the configured backend and drives degraded mode.
fn spawn_storage_supervisor(state: SharedState) {
    let backend = state.config().store();
    info!(store = ?backend, "starting storage supervisor");

    match backend {
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            tokio::spawn(storage_supervisor::run(state, connect_mongo));
        }
        #[cfg(feature = "couch-store")]
        StoreBackend::Couch => {
            tokio::spawn(storage_supervisor::run(state, connect_couch));
        }
        StoreBackend::Memory => spawn_memory_store(state),
        #[allow(unreachable_patterns)]
        other => {
            warn!(store = ?other, "backend not compiled in; falling back to the memory store");
            spawn_memory_store(state);
        }
    }
}

fn spawn_memory_store(state: SharedState) {
    let memory = MemoryBingoStore::new();
    tokio::spawn(storage_supervisor::run(state, move || {
        let store: Arc<dyn BingoStore> = Arc::new(memory.clone());
        async move { Ok(store) }
    }));
}

#[cfg(feature = "mongo-store")]
async fn connect_mongo() -> Result<Arc<dyn BingoStore>, StorageError> {
    use team_bingo_back::dao::bingo_store::mongodb::{MongoBingoStore, MongoConfig};

    let config = MongoConfig::from_env().await?;
    let store = MongoBingoStore::connect(config).await?;
    Ok(Arc::new(store))
}

#[cfg(feature = "couch-store")]
async fn connect_couch() -> Result<Arc<dyn BingoStore>, StorageError> {
    use team_bingo_back::dao::bingo_store::couchdb::{CouchBingoStore, CouchConfig};

    let config = CouchConfig::from_env()?;
    let store = CouchBingoStore::connect(config).await?;
    Ok(Arc::new(store))
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
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
