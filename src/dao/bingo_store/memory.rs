//! Process-local store used by tests and by the `memory` backend.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::dao::{
    bingo_store::{ANSWERS_COLLECTION, BingoStore},
    models::{AnswerEntity, MissionBoardEntity, PlayerEntity, PlayerUpdate, answer_key},
    storage::{StorageError, StorageResult},
};

/// Raised by every operation while the store is switched offline.
#[derive(Debug, Error)]
#[error("memory store is offline")]
pub struct MemoryStoreOffline;

/// [`BingoStore`] kept entirely in process memory.
#[derive(Clone)]
pub struct MemoryBingoStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    missions: RwLock<Option<MissionBoardEntity>>,
    players: DashMap<String, PlayerEntity>,
    answers: DashMap<String, AnswerEntity>,
    online: AtomicBool,
}

impl MemoryBingoStore {
    /// Empty, online store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                missions: RwLock::new(None),
                players: DashMap::new(),
                answers: DashMap::new(),
                online: AtomicBool::new(true),
            }),
        }
    }

    /// Simulate losing (or regaining) the connection to the store.
    pub fn set_online(&self, online: bool) {
        self.inner.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.inner.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::unavailable(
                MemoryStoreOffline.to_string(),
                MemoryStoreOffline,
            ))
        }
    }
}

impl Default for MemoryBingoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BingoStore for MemoryBingoStore {
    fn load_missions(&self) -> BoxFuture<'static, StorageResult<Option<MissionBoardEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.inner.missions.read().await.clone())
        })
    }

    fn save_missions(&self, missions: MissionBoardEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            *store.inner.missions.write().await = Some(missions);
            Ok(())
        })
    }

    fn find_player(&self, token: String) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.inner.players.get(&token).map(|entry| entry.clone()))
        })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            store.inner.players.insert(player.token.clone(), player);
            Ok(())
        })
    }

    fn update_player(
        &self,
        token: String,
        update: PlayerUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let Some(mut player) = store.inner.players.get_mut(&token) else {
                return Ok(false);
            };
            match update {
                PlayerUpdate::Locked(locked) => player.locked = locked,
                PlayerUpdate::Completed(completed) => player.completed = completed,
            }
            player.updated_at = SystemTime::now();
            Ok(true)
        })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store
                .inner
                .players
                .iter()
                .map(|entry| entry.value().clone())
                .collect())
        })
    }

    fn find_answer(
        &self,
        token: String,
        number: u8,
    ) -> BoxFuture<'static, StorageResult<Option<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let key = answer_key(&token, number);
            Ok(store.inner.answers.get(&key).map(|entry| entry.clone()))
        })
    }

    fn insert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            match store.inner.answers.entry(answer.key()) {
                Entry::Occupied(entry) => Err(StorageError::AlreadyExists {
                    collection: ANSWERS_COLLECTION,
                    id: entry.key().clone(),
                }),
                Entry::Vacant(entry) => {
                    entry.insert(answer);
                    Ok(())
                }
            }
        })
    }

    fn list_answers(&self) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store
                .inner
                .answers
                .iter()
                .map(|entry| entry.value().clone())
                .collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }
}
