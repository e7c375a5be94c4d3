//! Shared types for the KA retail ordering client
//!
//! Wire and domain types used by `ka-client` and anything talking to the same
//! backend: catalog rows and items, cart lines, orders, user sessions, the size
//! table, the RPC response envelope and the unified error-code system.

pub mod error;
pub mod models;
pub mod response;
pub mod serde_helpers;
pub mod sizes;
pub mod util;

// Re-exports
pub use error::{AppError, ErrorCategory, ErrorCode};
pub use models::{CartLine, CatalogItem, Order, OrderStatus, SkuRow, UserSession};
pub use response::RpcResponse;
pub use serde::{Deserialize, Serialize};
