//! Unified error system for the ordering client
//!
//! - [`ErrorCode`]: Standardized error codes for every failure the UI can show
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with code, message and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication / session errors
//! - 4xxx: Cart and order errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors (network, local storage, configuration)
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::EmptyCart);
//! assert_eq!(err.message, "Your cart is empty");
//!
//! let err = AppError::with_message(ErrorCode::CounterContention, "counter busy")
//!     .with_detail("path", "counters/referenceNumber");
//! assert!(err.is_retryable());
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::AppError;
