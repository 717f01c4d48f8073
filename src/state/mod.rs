/// Board validation and line counting.
pub mod board;
/// In-process change feed.
pub mod feed;
/// The shared mission document.
pub mod mission;
/// Player session lifecycle.
pub mod session;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::bingo_store::BingoStore, error::ServiceError};

use self::feed::{ChangeFeed, FeedEvent};

/// Cheaply cloneable handle passed to every handler and service.
pub type SharedState = Arc<AppState>;

/// Central application state: storage handle, change feed and configuration.
pub struct AppState {
    store: RwLock<Option<Arc<dyn BingoStore>>>,
    feed: ChangeFeed,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            feed: ChangeFeed::new(),
            degraded: degraded_tx,
            config,
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn BingoStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store or [`ServiceError::Degraded`].
    pub async fn require_store(&self) -> Result<Arc<dyn BingoStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn BingoStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Change feed every successful write is published on.
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Update the degraded flag and publish it when the value changes.
    fn update_degraded(&self, value: bool) {
        let changed = self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });

        if changed {
            self.feed.publish(&FeedEvent::StatusChanged { degraded: value });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{dao::bingo_store::memory::MemoryBingoStore, state::feed::Topic};

    #[tokio::test]
    async fn starts_degraded_until_store_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_store().await,
            Err(ServiceError::Degraded)
        ));

        state.install_store(Arc::new(MemoryBingoStore::new())).await;
        assert!(!state.is_degraded());
        assert!(state.require_store().await.is_ok());
    }

    #[tokio::test]
    async fn status_changes_are_published_once() {
        let state = AppState::new(AppConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        state.feed().subscribe(Topic::Missions, move |event| {
            if let FeedEvent::StatusChanged { degraded } = event {
                sink.lock().unwrap().push(*degraded);
            }
        });

        let store: Arc<dyn BingoStore> = Arc::new(MemoryBingoStore::new());
        state.install_store(store.clone()).await;
        state.install_store(store).await;
        state.clear_store().await;

        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    }
}
