use thiserror::Error;

use crate::storage::StorageError;

pub type ClientResult<T> = core::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// A 2xx reply whose body did not match the expected contract.
    #[error("Unexpected response: {0}")]
    Protocol(String),
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// True for failures that came back from the server or the wire, which the
    /// load path reports as a fetch failure.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Server { .. } | ClientError::Protocol(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
