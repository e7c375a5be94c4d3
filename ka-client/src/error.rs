//! Client error types

use shared::ErrorCode;
use thiserror::Error;

/// Errors from the realtime database and RPC transports
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (unreachable, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the server
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transaction gave up after too many conflicts
    #[error("Too many conflicting writers at {0}")]
    Contention(String),

    /// Key already exists for a create-only write
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// RPC endpoint answered `success: false`
    #[error("{0}")]
    Rejected(String),
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Http(e) if e.is_decode() => ErrorCode::InvalidFormat,
            ClientError::Http(_) => ErrorCode::NetworkError,
            ClientError::Status { status, .. } if *status >= 500 => ErrorCode::NetworkError,
            ClientError::Status { .. } => ErrorCode::RemoteError,
            ClientError::InvalidResponse(_) | ClientError::Serialization(_) => {
                ErrorCode::InvalidFormat
            }
            ClientError::Contention(_) => ErrorCode::CounterContention,
            ClientError::AlreadyExists(_) => ErrorCode::OrderWriteFailed,
            ClientError::Rejected(_) => ErrorCode::RemoteError,
        }
    }

    /// Network-level failure (the remote could not be reached at all)
    pub fn is_network(&self) -> bool {
        matches!(self.code(), ErrorCode::NetworkError)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = ClientError::Status {
            status: 503,
            body: "down".into(),
        };
        assert_eq!(err.code(), ErrorCode::NetworkError);
        assert!(err.is_network());

        let err = ClientError::Status {
            status: 401,
            body: "Permission denied".into(),
        };
        assert_eq!(err.code(), ErrorCode::RemoteError);
        assert!(!err.is_network());

        assert_eq!(
            ClientError::Contention("counters/referenceNumber".into()).code(),
            ErrorCode::CounterContention
        );
        assert_eq!(
            ClientError::InvalidResponse("x".into()).code(),
            ErrorCode::InvalidFormat
        );
    }
}
