//! CouchDB backend: one database, collections encoded as `_id` prefixes.

mod config;
mod error;
mod models;
mod store;

pub use config::{CouchConfig, CouchCredentials};
pub use error::CouchDaoError;
pub use store::CouchBingoStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::Conflict { collection, id } => {
                StorageError::AlreadyExists { collection, id }
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict() -> CouchDaoError {
        CouchDaoError::Conflict {
            collection: "players",
            id: "player::team-a".into(),
        }
    }

    #[test]
    fn create_only_conflict_means_already_exists() {
        assert!(matches!(
            StorageError::from(conflict()),
            StorageError::AlreadyExists { collection: "players", .. }
        ));
    }

    #[test]
    fn exhausted_overwrite_is_not_reported_as_existing() {
        let err = conflict().exhausted(3);
        assert!(matches!(
            err,
            CouchDaoError::ConcurrentUpdate { attempts: 3, .. }
        ));
        assert!(matches!(
            StorageError::from(err),
            StorageError::Unavailable { .. }
        ));
    }

    #[test]
    fn exhausted_leaves_other_errors_alone() {
        let err = CouchDaoError::MissingEnvVar { var: "COUCH_BASE_URL" }.exhausted(3);
        assert!(matches!(err, CouchDaoError::MissingEnvVar { .. }));
    }
}
