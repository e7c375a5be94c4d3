//! Remote data store
//!
//! The ordering client reads the catalog from, and writes orders to, a
//! realtime database. [`RemoteStore`] is the seam between the catalog/order
//! logic and that database:
//!
//! - [`RealtimeStore`]: the REST-backed implementation used in production
//! - [`MemoryStore`]: an in-process store with call counters and failure
//!   injection, used by tests and offline demos

mod memory;
mod realtime;

pub use memory::{MemoryStore, StoreCalls};
pub use realtime::RealtimeStore;

use crate::ClientResult;
use async_trait::async_trait;
use serde_json::Value;
use shared::Order;

/// Attempts a counter transaction makes before giving up
pub const MAX_TRANSACTION_RETRIES: usize = 25;

/// Remote node paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Array of SKU rows
    pub catalog_items: String,
    /// Last-modified marker (ms since epoch)
    pub catalog_last_modified: String,
    /// Reference-number counter
    pub reference_counter: String,
    /// Parent of `<referenceNumber>` order records
    pub pending_orders: String,
}

impl Default for StorePaths {
    fn default() -> Self {
        Self {
            catalog_items: "catalog/items".into(),
            catalog_last_modified: "catalog/lastModified".into(),
            reference_counter: "counters/referenceNumber".into(),
            pending_orders: "pendingOrders".into(),
        }
    }
}

impl StorePaths {
    pub fn order_path(&self, reference_number: &str) -> String {
        format!("{}/{}", self.pending_orders, reference_number)
    }
}

/// Operations the ordering client needs from the remote store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Raw catalog payload; `Value::Null` when nothing is stored
    async fn catalog_rows(&self) -> ClientResult<Value>;

    /// Catalog last-modified marker; 0 when unset
    async fn catalog_last_modified(&self) -> ClientResult<i64>;

    /// Atomically increment the reference counter and return the new value
    ///
    /// Conflicting writers are retried inside the implementation, up to
    /// [`MAX_TRANSACTION_RETRIES`] attempts. On error the counter is unchanged.
    async fn increment_counter(&self) -> ClientResult<u64>;

    /// Store an order under its reference number; never overwrites
    async fn create_order(&self, order: &Order) -> ClientResult<()>;
}

/// Counter value from the first read of a transaction; a missing node counts as 0
pub(crate) fn counter_value(value: &Value) -> Option<u64> {
    match value {
        Value::Null => Some(0),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Interpret a stored last-modified marker
pub(crate) fn marker_value(value: &Value) -> Option<i64> {
    match value {
        Value::Null => Some(0),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_paths() {
        let paths = StorePaths::default();
        assert_eq!(paths.order_path("042"), "pendingOrders/042");
        assert_eq!(paths.reference_counter, "counters/referenceNumber");
    }

    #[test]
    fn test_counter_value() {
        assert_eq!(counter_value(&Value::Null), Some(0));
        assert_eq!(counter_value(&json!(41)), Some(41));
        assert_eq!(counter_value(&json!(-1)), None);
        assert_eq!(counter_value(&json!("41")), None);
    }

    #[test]
    fn test_marker_value() {
        assert_eq!(marker_value(&Value::Null), Some(0));
        assert_eq!(marker_value(&json!(1714550000000_i64)), Some(1714550000000));
        assert_eq!(marker_value(&json!(1714550000000.0)), Some(1714550000000));
        assert_eq!(marker_value(&json!("17")), Some(17));
        assert_eq!(marker_value(&json!({"at": 1})), None);
    }
}
