//! Model error types.

use thiserror::Error;

use crate::cast::CastError;
use crate::errors::ErrorResponse;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while filling entities or running provider actions.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cast failed for attribute `{key}`: {source}")]
    Cast {
        key: String,
        #[source]
        source: CastError,
    },

    #[error("invalid attributes: {0}")]
    InvalidAttributes(String),

    #[error("request failed with status {}", .0.status)]
    Response(ErrorResponse),

    #[error("request cancelled")]
    Cancelled(Option<String>),

    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ModelError {
    /// HTTP status of the failed response, if the remote end answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ModelError::Response(response) => Some(response.status),
            _ => None,
        }
    }

    /// Returns true for a 422 validation failure.
    pub fn is_validation(&self) -> bool {
        self.status() == Some(422)
    }

    /// Returns true if the request was aborted through the provider's cancel token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ModelError::Cancelled(_))
    }
}
