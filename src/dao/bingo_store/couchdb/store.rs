use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::debug;

use crate::dao::{
    bingo_store::BingoStore,
    models::{AnswerEntity, MissionBoardEntity, PlayerEntity, PlayerUpdate},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{ANSWER_PREFIX, AllDocsResponse, CouchDocument, DocRef, END_SUFFIX, PLAYER_PREFIX},
};

const ALL_DOCS: &str = "_all_docs";
const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// [`BingoStore`] backed by a CouchDB database over HTTP.
#[derive(Clone)]
pub struct CouchBingoStore {
    client: Client,
    base_url: Arc<Url>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchBingoStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let auth = config.credentials.map(|credentials| {
            (
                Arc::<str>::from(credentials.username),
                Arc::<str>::from(credentials.password),
            )
        });

        let store = Self {
            client,
            base_url: Arc::new(config.base_url),
            database: Arc::<str>::from(config.database),
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    /// URL of `segments` below the database, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> CouchResult<Url> {
        let mut url = (*self.base_url).clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| CouchDaoError::InvalidBaseUrl {
                    url: self.base_url.to_string(),
                })?;
            path.pop_if_empty().push(&self.database).extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.url(&[])?;

        let response = self
            .request(Method::GET, url.clone())
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .request(Method::PUT, url)
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    debug!(database = %database, "created CouchDB database");
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc: &DocRef) -> CouchResult<Option<CouchDocument<T>>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, self.url(&[doc.id.as_str()])?)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc.id.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<CouchDocument<T>>()
                .await
                .map(Some)
                .map_err(|source| CouchDaoError::DecodeResponse {
                    path: doc.id.clone(),
                    source,
                }),
            other => Err(CouchDaoError::RequestStatus {
                path: doc.id.clone(),
                status: other,
            }),
        }
    }

    /// PUT a document; CouchDB answers 409 when `rev` is stale or missing for an existing id.
    async fn put_document<T>(&self, doc: &DocRef, document: &CouchDocument<T>) -> CouchResult<()>
    where
        T: Serialize,
    {
        let response = self
            .request(Method::PUT, self.url(&[doc.id.as_str()])?)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc.id.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict {
                collection: doc.collection,
                id: doc.id.clone(),
            }),
            status if status.is_success() => Ok(()),
            other => Err(CouchDaoError::RequestStatus {
                path: doc.id.clone(),
                status: other,
            }),
        }
    }

    /// Overwrite a document whatever its current revision, refetching `_rev` on conflict.
    async fn upsert_document<T>(&self, doc: DocRef, body: T) -> CouchResult<()>
    where
        T: Serialize,
    {
        let mut document = CouchDocument::new(doc.id.clone(), body);
        let mut attempts = 0;

        loop {
            attempts += 1;
            document.rev = self
                .get_document::<serde_json::Value>(&doc)
                .await?
                .and_then(|existing| existing.rev);

            match self.put_document(&doc, &document).await {
                Err(CouchDaoError::Conflict { .. }) if attempts < MAX_UPDATE_ATTEMPTS => {
                    debug!(id = %doc.id, attempts, "document revision moved, retrying overwrite");
                }
                other => return other.map_err(|err| err.exhausted(attempts)),
            }
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let encode = |key: String| {
            serde_json::to_string(&key).map_err(|source| CouchDaoError::DeserializeValue {
                path: ALL_DOCS.to_owned(),
                source,
            })
        };
        let query = [
            ("include_docs", "true".to_owned()),
            ("startkey", encode(prefix.to_owned())?),
            ("endkey", encode(format!("{prefix}{END_SUFFIX}"))?),
        ];

        let response = self
            .request(Method::GET, self.url(&[ALL_DOCS])?)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_owned(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_owned(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_owned(),
                source,
            }
        })?;

        payload
            .rows
            .into_iter()
            .filter_map(|row| row.doc)
            .map(|doc| {
                from_value::<CouchDocument<T>>(doc)
                    .map(|document| document.body)
                    .map_err(|source| CouchDaoError::DeserializeValue {
                        path: ALL_DOCS.to_owned(),
                        source,
                    })
            })
            .collect()
    }

    async fn update_player(&self, token: String, update: PlayerUpdate) -> CouchResult<bool> {
        let doc = DocRef::player(&token);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let Some(mut document) = self.get_document::<PlayerEntity>(&doc).await? else {
                return Ok(false);
            };

            match &update {
                PlayerUpdate::Locked(locked) => document.body.locked = *locked,
                PlayerUpdate::Completed(completed) => document.body.completed = completed.clone(),
            }
            document.body.updated_at = SystemTime::now();

            match self.put_document(&doc, &document).await {
                Err(CouchDaoError::Conflict { .. }) if attempts < MAX_UPDATE_ATTEMPTS => {
                    debug!(token = %token, attempts, "player document changed underneath, retrying");
                }
                other => return other.map(|()| true).map_err(|err| err.exhausted(attempts)),
            }
        }
    }

    async fn ping(&self) -> CouchResult<()> {
        let url = self.url(&[])?;
        let path = url.to_string();
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path,
                status: response.status(),
            })
        }
    }
}

impl BingoStore for CouchBingoStore {
    fn load_missions(&self) -> BoxFuture<'static, StorageResult<Option<MissionBoardEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store
                .get_document::<MissionBoardEntity>(&DocRef::missions())
                .await?;
            Ok(document.map(|document| document.body))
        })
    }

    fn save_missions(&self, missions: MissionBoardEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert_document(DocRef::missions(), missions)
                .await
                .map_err(Into::into)
        })
    }

    fn find_player(&self, token: String) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store
                .get_document::<PlayerEntity>(&DocRef::player(&token))
                .await?;
            Ok(document.map(|document| document.body))
        })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert_document(DocRef::player(&player.token), player)
                .await
                .map_err(Into::into)
        })
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
        Box::pin(async move {
            store
                .list_documents::<PlayerEntity>(PLAYER_PREFIX)
                .await
                .map_err(Into::into)
        })
    }

    fn find_answer(
        &self,
        token: String,
        number: u8,
    ) -> BoxFuture<'static, StorageResult<Option<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store
                .get_document::<AnswerEntity>(&DocRef::answer(&token, number))
                .await?;
            Ok(document.map(|document| document.body))
        })
    }

    fn insert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = DocRef::answer(&answer.token, answer.mission_number);
            let document = CouchDocument::new(doc.id.clone(), answer);
            store.put_document(&doc, &document).await.map_err(Into::into)
        })
    }

    fn list_answers(&self) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_documents::<AnswerEntity>(ANSWER_PREFIX)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
