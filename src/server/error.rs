use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::domain::{ErrorBody, StoreError};

/// Request-level failure, rendered as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::MissingToken | StoreError::ReasonTooLong) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Store(StoreError::AlreadyExists) => StatusCode::CONFLICT,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Failure while starting or running the server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid Content-Security-Policy value")]
    InvalidCsp,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StorageError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Store(StoreError::MissingToken).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Store(StoreError::AlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Store(StoreError::Persistence(StorageError::Corrupt("x".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::MalformedPayload("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        assert_eq!(
            AppError::Store(StoreError::AlreadyExists).to_string(),
            "a submission for this token already exists"
        );
    }
}
