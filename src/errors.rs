//! Error types for the ingestion service.
//!
//! Every failure the store or the handlers can produce is an [`IngestError`].
//! The ingestion route folds all of them into its `erro` envelope; the listing
//! route lets them surface through the [`IntoResponse`] impl below.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    /// The request body was not a JSON object.
    #[error("{message}")]
    BadRequest { message: String },

    /// The backing store could not be opened, read or written.
    #[error("store unavailable: {operation} failed: {source}")]
    StoreUnavailable {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing store does not hold a JSON array of objects.
    #[error("store is corrupt: {source}")]
    CorruptStore {
        #[source]
        source: serde_json::Error,
    },

    #[error("internal error: {message}")]
    Internal { message: String },
}

pub type IngestResult<T> = Result<T, IngestError>;

impl IngestError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn store_unavailable(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::StoreUnavailable {
            operation: operation.into(),
            source,
        }
    }

    pub fn corrupt_store(source: serde_json::Error) -> Self {
        Self::CorruptStore { source }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            IngestError::StoreUnavailable { .. }
            | IngestError::CorruptStore { .. }
            | IngestError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

impl From<tokio::task::JoinError> for IngestError {
    fn from(err: tokio::task::JoinError) -> Self {
        IngestError::internal(format!("store task did not complete: {err}"))
    }
}
