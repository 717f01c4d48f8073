//! Error types shared by the CouchDB storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`CouchDaoError`] failures.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while interacting with CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Required environment variable is missing.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The configured base URL cannot address documents.
    #[error("invalid CouchDB base URL `{url}`")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB rejected a database creation request.
    #[error("failed to create CouchDB database `{database}`")]
    DatabaseCreate {
        /// Database name.
        database: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code for a database operation.
    #[error("unexpected CouchDB database response status {status} for `{database}`")]
    DatabaseStatus {
        /// Database name.
        database: String,
        /// Status CouchDB answered with.
        status: StatusCode,
    },
    /// A request to a document endpoint could not be sent.
    #[error("failed to send CouchDB request to `{path}`")]
    RequestSend {
        /// Document path the request targeted.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code for a document endpoint.
    #[error("unexpected CouchDB response status {status} for `{path}`")]
    RequestStatus {
        /// Document path the request targeted.
        path: String,
        /// Status CouchDB answered with.
        status: StatusCode,
    },
    /// A create-only write found the document already present.
    #[error("document `{id}` already exists in `{collection}`")]
    Conflict {
        /// Logical collection of the document.
        collection: &'static str,
        /// Document `_id`.
        id: String,
    },
    /// An overwrite kept losing the revision race.
    #[error("document `{id}` in `{collection}` kept changing after {attempts} attempts")]
    ConcurrentUpdate {
        /// Logical collection of the document.
        collection: &'static str,
        /// Document `_id`.
        id: String,
        /// Writes attempted before giving up.
        attempts: u32,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        /// Document path the request targeted.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// Decoding a JSON value into the expected model failed.
    #[error("failed to deserialize CouchDB value for `{path}`")]
    DeserializeValue {
        /// Document path the value came from.
        path: String,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
}

impl CouchDaoError {
    /// Turn the conflict of a final overwrite attempt into [`CouchDaoError::ConcurrentUpdate`].
    pub(super) fn exhausted(self, attempts: u32) -> Self {
        match self {
            CouchDaoError::Conflict { collection, id } => CouchDaoError::ConcurrentUpdate {
                collection,
                id,
                attempts,
            },
            other => other,
        }
    }
}
