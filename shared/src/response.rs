//! RPC response envelope
//!
//! The auth endpoint answers every action with the same shape:
//! ```json
//! {
//!     "success": true,
//!     "message": "OTP sent",
//!     "data": { ... }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Unified RPC response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    /// Whether the action succeeded
    pub success: bool,
    /// Human-readable message (shown to the user on failure)
    #[serde(default)]
    pub message: String,
    /// Action payload (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> RpcResponse<T> {
    /// Payload of a successful response, or the server's message on failure
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.message)
        }
    }
}
