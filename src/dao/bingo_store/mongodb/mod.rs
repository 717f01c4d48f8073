//! MongoDB backend: one collection per document kind.

mod config;
mod error;
mod models;
/// [`MongoBingoStore`] and its [`BingoStore`](crate::dao::bingo_store::BingoStore) impl.
pub mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoBingoStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        if let Some((collection, id)) = err.duplicate_key() {
            return StorageError::AlreadyExists { collection, id };
        }
        StorageError::unavailable(err.to_string(), err)
    }
}
