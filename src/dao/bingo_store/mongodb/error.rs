use mongodb::error::{Error as MongoError, ErrorKind, WriteError, WriteFailure};
use thiserror::Error;

/// Result alias for MongoDB backend operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failures of the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection string could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// URI as configured.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The driver refused the client options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered the connection ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings sent.
        attempts: u32,
        /// Error of the last ping.
        #[source]
        source: MongoError,
    },
    /// A periodic health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading one document failed.
    #[error("failed to read `{id}` from `{collection}`")]
    Load {
        /// Collection read from.
        collection: &'static str,
        /// Document `_id`.
        id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Writing one document failed.
    #[error("failed to write `{id}` to `{collection}`")]
    Save {
        /// Collection written to.
        collection: &'static str,
        /// Document `_id`.
        id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Scanning a collection failed.
    #[error("failed to list `{collection}`")]
    List {
        /// Collection scanned.
        collection: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}

impl MongoDaoError {
    /// Collection and id of a write rejected by a unique `_id`.
    pub fn duplicate_key(&self) -> Option<(&'static str, String)> {
        let MongoDaoError::Save {
            collection,
            id,
            source,
        } = self
        else {
            return None;
        };

        matches!(
            source.kind.as_ref(),
            ErrorKind::Write(WriteFailure::WriteError(WriteError {
                code: DUPLICATE_KEY_CODE,
                ..
            }))
        )
        .then(|| (*collection, id.clone()))
    }
}
