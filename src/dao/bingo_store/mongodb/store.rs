use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{DateTime, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoAnswerDocument, MongoMissionsDocument, MongoPlayerDocument, answer_doc_id, doc_id,
    },
};
use crate::dao::{
    bingo_store::{ANSWERS_COLLECTION, BingoStore, MISSIONS_COLLECTION, MISSIONS_DOC_ID, PLAYERS_COLLECTION},
    models::{AnswerEntity, MissionBoardEntity, PlayerEntity, PlayerUpdate, answer_key},
    storage::StorageResult,
};

/// [`BingoStore`] backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoBingoStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = self.config.open().await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoBingoStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = config.open().await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.answers().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"submitted_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("answer_submitted_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: ANSWERS_COLLECTION,
                id: "answer_submitted_idx".to_owned(),
                source,
            })?;
        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn missions(&self) -> Collection<MongoMissionsDocument> {
        self.database().await.collection(MISSIONS_COLLECTION)
    }

    async fn players(&self) -> Collection<MongoPlayerDocument> {
        self.database().await.collection(PLAYERS_COLLECTION)
    }

    async fn answers(&self) -> Collection<MongoAnswerDocument> {
        self.database().await.collection(ANSWERS_COLLECTION)
    }

    async fn load_missions(&self) -> MongoResult<Option<MissionBoardEntity>> {
        let document = self
            .missions()
            .await
            .find_one(doc_id(MISSIONS_DOC_ID))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: MISSIONS_COLLECTION,
                id: MISSIONS_DOC_ID.to_owned(),
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn save_missions(&self, missions: MissionBoardEntity) -> MongoResult<()> {
        let document: MongoMissionsDocument = missions.into();
        self.missions()
            .await
            .replace_one(doc_id(MISSIONS_DOC_ID), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: MISSIONS_COLLECTION,
                id: MISSIONS_DOC_ID.to_owned(),
                source,
            })?;
        Ok(())
    }

    async fn find_player(&self, token: String) -> MongoResult<Option<PlayerEntity>> {
        let document = self
            .players()
            .await
            .find_one(doc_id(&token))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: PLAYERS_COLLECTION,
                id: token,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn save_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let token = player.token.clone();
        let document: MongoPlayerDocument = player.into();
        self.players()
            .await
            .replace_one(doc_id(&token), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: PLAYERS_COLLECTION,
                id: token,
                source,
            })?;
        Ok(())
    }

    async fn update_player(&self, token: String, update: PlayerUpdate) -> MongoResult<bool> {
        let now = DateTime::from_system_time(SystemTime::now());
        let change = match update {
            PlayerUpdate::Locked(locked) => doc! {"locked": locked, "updated_at": now},
            PlayerUpdate::Completed(completed) => {
                let completed: Vec<i32> = completed.into_iter().map(i32::from).collect();
                doc! {"completed": completed, "updated_at": now}
            }
        };

        let result = self
            .players()
            .await
            .update_one(doc_id(&token), doc! {"$set": change})
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: PLAYERS_COLLECTION,
                id: token,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn list_players(&self) -> MongoResult<Vec<PlayerEntity>> {
        let documents: Vec<MongoPlayerDocument> = self
            .players()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::List {
                collection: PLAYERS_COLLECTION,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                collection: PLAYERS_COLLECTION,
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_answer(&self, token: String, number: u8) -> MongoResult<Option<AnswerEntity>> {
        let document = self
            .answers()
            .await
            .find_one(answer_doc_id(&token, number))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: ANSWERS_COLLECTION,
                id: answer_key(&token, number),
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn insert_answer(&self, answer: AnswerEntity) -> MongoResult<()> {
        let id = answer.key();
        let document: MongoAnswerDocument = answer.into();
        self.answers()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: ANSWERS_COLLECTION,
                id,
                source,
            })?;
        Ok(())
    }

    async fn list_answers(&self) -> MongoResult<Vec<AnswerEntity>> {
        let documents: Vec<MongoAnswerDocument> = self
            .answers()
            .await
            .find(doc! {})
            .sort(doc! {"submitted_at": 1})
            .await
            .map_err(|source| MongoDaoError::List {
                collection: ANSWERS_COLLECTION,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                collection: ANSWERS_COLLECTION,
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl BingoStore for MongoBingoStore {
    fn load_missions(&self) -> BoxFuture<'static, StorageResult<Option<MissionBoardEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.load_missions().await.map_err(Into::into) })
    }

    fn save_missions(&self, missions: MissionBoardEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_missions(missions).await.map_err(Into::into) })
    }

    fn find_player(&self, token: String) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_player(token).await.map_err(Into::into) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_player(player).await.map_err(Into::into) })
    }

    fn update_player(
        &self,
        token: String,
        update: PlayerUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.update_player(token, update).await.map_err(Into::into) })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_players().await.map_err(Into::into) })
    }

    fn find_answer(
        &self,
        token: String,
        number: u8,
    ) -> BoxFuture<'static, StorageResult<Option<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_answer(token, number).await.map_err(Into::into) })
    }

    fn insert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_answer(answer).await.map_err(Into::into) })
    }

    fn list_answers(&self) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_answers().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
