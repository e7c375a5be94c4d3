//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication / session errors
//! - 4xxx: Cart and order errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values on the wire so the same codes can be shared with
/// any frontend rendering them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Invalid format
    InvalidFormat = 6,

    // ==================== 1xxx: Auth ====================
    /// User is not logged in
    NotAuthenticated = 1001,
    /// Session has expired
    SessionExpired = 1005,
    /// Account has been deactivated by an administrator
    AccountDisabled = 1007,
    /// Email address is malformed
    InvalidEmail = 1010,
    /// OTP is not six digits
    InvalidOtp = 1011,
    /// Server rejected the OTP
    OtpRejected = 1012,

    // ==================== 4xxx: Cart / Order ====================
    /// Submitting an empty cart
    EmptyCart = 4001,
    /// Add-to-cart without any positive quantity
    NothingSelected = 4002,
    /// Cart line index out of range
    CartLineNotFound = 4003,
    /// Color not present on the cart line
    CartColorNotFound = 4004,
    /// Another submission is still in flight
    SubmissionInProgress = 4005,
    /// Reference-number transaction did not commit
    CounterContention = 4010,
    /// Order record write failed after the reference number was allocated
    OrderWriteFailed = 4011,

    // ==================== 6xxx: Catalog ====================
    /// Remote catalog has no rows
    CatalogEmpty = 6001,
    /// Remote catalog payload has the wrong shape
    CatalogInvalidShape = 6002,
    /// Neither the remote nor the local cache could provide items
    CatalogUnavailable = 6003,
    /// Catalog served from cache because the remote could not be reached
    CatalogStale = 6004,
    /// Style not found in the catalog
    StyleNotFound = 6005,

    // ==================== 9xxx: System ====================
    /// Remote unreachable or timed out
    NetworkError = 9002,
    /// Remote answered with an unexpected status or body
    RemoteError = 9003,
    /// Local cache storage is inaccessible
    CacheUnavailable = 9101,
    /// Local session file could not be read or written
    SessionStorageFailed = 9102,
    /// Configuration is invalid
    ConfigError = 9201,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether the user can simply try the same action again
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::CounterContention
                | ErrorCode::OrderWriteFailed
                | ErrorCode::SubmissionInProgress
                | ErrorCode::NetworkError
                | ErrorCode::RemoteError
                | ErrorCode::CatalogUnavailable
                | ErrorCode::CatalogStale
        )
    }

    /// Get the user-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::InvalidFormat => "Invalid format",

            // Auth
            ErrorCode::NotAuthenticated => "Please login to continue",
            ErrorCode::SessionExpired => "Session has expired, please login again",
            ErrorCode::AccountDisabled => {
                "Access denied: your account has been deactivated, please contact admin"
            }
            ErrorCode::InvalidEmail => "Please enter a valid email address",
            ErrorCode::InvalidOtp => "Please enter the 6-digit OTP",
            ErrorCode::OtpRejected => "Invalid or expired OTP",

            // Cart / Order
            ErrorCode::EmptyCart => "Your cart is empty",
            ErrorCode::NothingSelected => "Please select at least one size and quantity",
            ErrorCode::CartLineNotFound => "Cart line not found",
            ErrorCode::CartColorNotFound => "Color not found on cart line",
            ErrorCode::SubmissionInProgress => "An order is already being placed",
            ErrorCode::CounterContention => "Order failed, please retry",
            ErrorCode::OrderWriteFailed => "Order failed, please retry",

            // Catalog
            ErrorCode::CatalogEmpty => "No items found. Please contact administrator",
            ErrorCode::CatalogInvalidShape => "Invalid item data received from server",
            ErrorCode::CatalogUnavailable => {
                "Error loading item data. Please check your internet connection and retry"
            }
            ErrorCode::CatalogStale => "Could not sync with server. Using cached data",
            ErrorCode::StyleNotFound => "Selected item not found",

            // System
            ErrorCode::NetworkError => "Network error. Please check your connection",
            ErrorCode::RemoteError => "Server returned an unexpected response",
            ErrorCode::CacheUnavailable => "Local item cache is unavailable",
            ErrorCode::SessionStorageFailed => "Could not access saved login session",
            ErrorCode::ConfigError => "Invalid configuration",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            6 => Ok(ErrorCode::InvalidFormat),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1005 => Ok(ErrorCode::SessionExpired),
            1007 => Ok(ErrorCode::AccountDisabled),
            1010 => Ok(ErrorCode::InvalidEmail),
            1011 => Ok(ErrorCode::InvalidOtp),
            1012 => Ok(ErrorCode::OtpRejected),

            // Cart / Order
            4001 => Ok(ErrorCode::EmptyCart),
            4002 => Ok(ErrorCode::NothingSelected),
            4003 => Ok(ErrorCode::CartLineNotFound),
            4004 => Ok(ErrorCode::CartColorNotFound),
            4005 => Ok(ErrorCode::SubmissionInProgress),
            4010 => Ok(ErrorCode::CounterContention),
            4011 => Ok(ErrorCode::OrderWriteFailed),

            // Catalog
            6001 => Ok(ErrorCode::CatalogEmpty),
            6002 => Ok(ErrorCode::CatalogInvalidShape),
            6003 => Ok(ErrorCode::CatalogUnavailable),
            6004 => Ok(ErrorCode::CatalogStale),
            6005 => Ok(ErrorCode::StyleNotFound),

            // System
            9002 => Ok(ErrorCode::NetworkError),
            9003 => Ok(ErrorCode::RemoteError),
            9101 => Ok(ErrorCode::CacheUnavailable),
            9102 => Ok(ErrorCode::SessionStorageFailed),
            9201 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
