use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::{board::BoardError, session::SessionError},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A write-once document already exists.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A stored document no longer satisfies the board invariants.
    #[error("corrupted document: {0}")]
    Corrupted(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists { .. } => ServiceError::Conflict(err.to_string()),
            StorageError::Unavailable { .. } => ServiceError::Unavailable(err),
        }
    }
}

impl From<BoardError> for ServiceError {
    fn from(err: BoardError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<SessionError> for ServiceError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err {
            SessionError::MissingToken
            | SessionError::Board(_)
            | SessionError::NotOnBoard { .. } => ServiceError::InvalidInput(message),
            SessionError::AlreadyLocked | SessionError::NotLocked => {
                ServiceError::InvalidState(message)
            }
            SessionError::MissionHidden { .. } => ServiceError::NotFound(message),
            SessionError::AlreadySubmitted { .. } => ServiceError::Conflict(message),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) | ServiceError::Conflict(message) => {
                AppError::Conflict(message)
            }
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Corrupted(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ServiceError>) -> StatusCode {
        AppError::from(err.into()).into_response().status()
    }

    #[test]
    fn session_errors_map_to_http_status() {
        assert_eq!(status_of(SessionError::MissingToken), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(SessionError::NotLocked), StatusCode::CONFLICT);
        assert_eq!(status_of(SessionError::AlreadyLocked), StatusCode::CONFLICT);
        assert_eq!(
            status_of(SessionError::MissionHidden { number: 3 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(SessionError::NotOnBoard { number: 3 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(SessionError::AlreadySubmitted { number: 3 }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn board_errors_are_bad_requests() {
        let err = BoardError::IncompleteBoard {
            empty_cells: vec![24],
        };
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(BoardError::OutOfRange { value: 0 }), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_errors_split_between_conflict_and_unavailable() {
        let exists = StorageError::AlreadyExists {
            collection: "answers",
            id: "t_1".into(),
        };
        assert_eq!(status_of(exists), StatusCode::CONFLICT);

        let io = std::io::Error::other("connection reset");
        let unavailable = StorageError::unavailable("ping failed".into(), io);
        assert_eq!(status_of(unavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(ServiceError::Degraded), StatusCode::SERVICE_UNAVAILABLE);
    }
}
