//! Document stores behind the [`BingoStore`] trait.

/// CouchDB backend over its HTTP API.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process store for tests and fallback.
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{AnswerEntity, MissionBoardEntity, PlayerEntity, PlayerUpdate};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Collection holding the single shared mission document.
pub const MISSIONS_COLLECTION: &str = "missions";
/// Identifier of the shared mission document.
pub const MISSIONS_DOC_ID: &str = "missions";
/// Collection holding one document per player token.
pub const PLAYERS_COLLECTION: &str = "players";
/// Collection holding one document per `token_number` answer key.
pub const ANSWERS_COLLECTION: &str = "answers";

/// Abstraction over the document store backing missions, players and answers.
pub trait BingoStore: Send + Sync {
    /// Read the mission document, if it was ever saved.
    fn load_missions(&self) -> BoxFuture<'static, StorageResult<Option<MissionBoardEntity>>>;
    /// Overwrite the mission document.
    fn save_missions(&self, missions: MissionBoardEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Read a player document by token.
    fn find_player(&self, token: String) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Overwrite (or create) a player document.
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Merge a single field into an existing player document; `false` when no document matched.
    fn update_player(
        &self,
        token: String,
        update: PlayerUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Read every player document.
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Read the answer of `token` to mission `number`.
    fn find_answer(
        &self,
        token: String,
        number: u8,
    ) -> BoxFuture<'static, StorageResult<Option<AnswerEntity>>>;
    /// Create an answer; fails with `AlreadyExists` when the key is taken.
    fn insert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Read every answer document.
    fn list_answers(&self) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>>;
    /// Cheap round-trip used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the underlying connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
