//! Application error type

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// Component errors in `ka-client` convert into this type at the point where
/// they reach the user: the code picks the displayed message, the details carry
/// context for logs.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Whether the user may retry the failed action as-is
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// The message to show the user: the code's standard text
    pub fn user_message(&self) -> &'static str {
        self.code.message()
    }
}

impl From<ErrorCode> for AppError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_message() {
        let err = AppError::new(ErrorCode::NothingSelected);
        assert_eq!(err.message, "Please select at least one size and quantity");
        assert!(err.details.is_none());
        assert_eq!(err.to_string(), err.message);
    }

    #[test]
    fn test_with_detail() {
        let err = AppError::with_message(ErrorCode::OrderWriteFailed, "write refused")
            .with_detail("reference_number", "042")
            .with_detail("line", 2);
        let details = err.details.unwrap();
        assert_eq!(details["reference_number"], "042");
        assert_eq!(details["line"], 2);
    }

    #[test]
    fn test_user_message_ignores_custom_message() {
        let err = AppError::with_message(ErrorCode::CounterContention, "412 after 25 attempts");
        assert_eq!(err.user_message(), "Order failed, please retry");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_serialize_code_as_number() {
        let err = AppError::new(ErrorCode::EmptyCart);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], 4001);
        assert!(json.get("details").is_none());
    }
}
