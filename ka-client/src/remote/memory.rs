//! In-process remote store

use super::{MAX_TRANSACTION_RETRIES, RemoteStore, StorePaths};
use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use shared::{Order, SkuRow};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct State {
    catalog: Value,
    last_modified: i64,
    counter: u64,
    orders: BTreeMap<String, Order>,
}

#[derive(Debug, Default)]
struct CallCounters {
    catalog_rows: AtomicUsize,
    last_modified: AtomicUsize,
    increment_counter: AtomicUsize,
    create_order: AtomicUsize,
}

/// Snapshot of how often each operation was called
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub catalog_rows: usize,
    pub last_modified: usize,
    pub increment_counter: usize,
    pub create_order: usize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.catalog_rows + self.last_modified + self.increment_counter + self.create_order
    }
}

#[derive(Debug, Default)]
struct Failures {
    catalog: AtomicBool,
    marker: AtomicBool,
    counter: AtomicBool,
    order: AtomicBool,
    /// Forced conflicts consumed by the next counter commits
    conflicts: AtomicUsize,
}

/// [`RemoteStore`] kept in memory
///
/// The counter uses the same read / compare / write cycle as the realtime
/// store, yielding between the read and the write so concurrent increments
/// really interleave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    paths: StorePaths,
    state: Mutex<State>,
    calls: CallCounters,
    failures: Failures,
}

fn injected(operation: &str) -> ClientError {
    ClientError::Status {
        status: 503,
        body: format!("injected failure: {}", operation),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(self, rows: &[SkuRow]) -> Self {
        self.set_catalog(rows);
        self
    }

    pub fn with_catalog_value(self, value: Value) -> Self {
        self.state.lock().catalog = value;
        self
    }

    pub fn with_last_modified(self, marker: i64) -> Self {
        self.set_last_modified(marker);
        self
    }

    pub fn with_counter(self, value: u64) -> Self {
        self.state.lock().counter = value;
        self
    }

    pub fn set_catalog(&self, rows: &[SkuRow]) {
        self.state.lock().catalog = serde_json::to_value(rows).unwrap_or(Value::Null);
    }

    pub fn set_catalog_value(&self, value: Value) {
        self.state.lock().catalog = value;
    }

    pub fn set_last_modified(&self, marker: i64) {
        self.state.lock().last_modified = marker;
    }

    /// Make catalog row reads fail
    pub fn fail_catalog(&self, fail: bool) {
        self.failures.catalog.store(fail, Ordering::SeqCst);
    }

    /// Make last-modified reads fail
    pub fn fail_marker(&self, fail: bool) {
        self.failures.marker.store(fail, Ordering::SeqCst);
    }

    /// Make counter transactions fail before reading the counter
    pub fn fail_counter(&self, fail: bool) {
        self.failures.counter.store(fail, Ordering::SeqCst);
    }

    /// Make order writes fail
    pub fn fail_order(&self, fail: bool) {
        self.failures.order.store(fail, Ordering::SeqCst);
    }

    /// Reject the next `count` counter commits as if another writer got there first
    pub fn inject_conflicts(&self, count: usize) {
        self.failures.conflicts.store(count, Ordering::SeqCst);
    }

    pub fn counter(&self) -> u64 {
        self.state.lock().counter
    }

    pub fn order(&self, reference_number: &str) -> Option<Order> {
        self.state.lock().orders.get(reference_number).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().orders.len()
    }

    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            catalog_rows: self.calls.catalog_rows.load(Ordering::SeqCst),
            last_modified: self.calls.last_modified.load(Ordering::SeqCst),
            increment_counter: self.calls.increment_counter.load(Ordering::SeqCst),
            create_order: self.calls.create_order.load(Ordering::SeqCst),
        }
    }

    fn take_conflict(&self) -> bool {
        self.failures
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn catalog_rows(&self) -> ClientResult<Value> {
        self.calls.catalog_rows.fetch_add(1, Ordering::SeqCst);
        if self.failures.catalog.load(Ordering::SeqCst) {
            return Err(injected("catalog_rows"));
        }
        Ok(self.state.lock().catalog.clone())
    }

    async fn catalog_last_modified(&self) -> ClientResult<i64> {
        self.calls.last_modified.fetch_add(1, Ordering::SeqCst);
        if self.failures.marker.load(Ordering::SeqCst) {
            return Err(injected("catalog_last_modified"));
        }
        Ok(self.state.lock().last_modified)
    }

    async fn increment_counter(&self) -> ClientResult<u64> {
        self.calls.increment_counter.fetch_add(1, Ordering::SeqCst);
        if self.failures.counter.load(Ordering::SeqCst) {
            return Err(injected("increment_counter"));
        }

        for _ in 0..MAX_TRANSACTION_RETRIES {
            let observed = self.state.lock().counter;
            tokio::task::yield_now().await;

            let mut state = self.state.lock();
            if self.take_conflict() || state.counter != observed {
                continue;
            }
            state.counter = observed + 1;
            return Ok(state.counter);
        }

        Err(ClientError::Contention(self.paths.reference_counter.clone()))
    }

    async fn create_order(&self, order: &Order) -> ClientResult<()> {
        self.calls.create_order.fetch_add(1, Ordering::SeqCst);
        if self.failures.order.load(Ordering::SeqCst) {
            return Err(injected("create_order"));
        }

        let mut state = self.state.lock();
        if state.orders.contains_key(&order.reference_number) {
            return Err(ClientError::AlreadyExists(
                self.paths.order_path(&order.reference_number),
            ));
        }
        state
            .orders
            .insert(order.reference_number.clone(), order.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_increment_from_unset() {
        let store = MemoryStore::new();
        assert_eq!(store.increment_counter().await.unwrap(), 1);
        assert_eq!(store.increment_counter().await.unwrap(), 2);
        assert_eq!(store.calls().increment_counter, 2);
    }

    #[tokio::test]
    async fn test_conflicts_are_retried() {
        let store = MemoryStore::new().with_counter(10);
        store.inject_conflicts(3);
        assert_eq!(store.increment_counter().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_exhausted_conflicts_leave_counter_unchanged() {
        let store = MemoryStore::new().with_counter(10);
        store.inject_conflicts(MAX_TRANSACTION_RETRIES);
        let err = store.increment_counter().await.unwrap_err();
        assert!(matches!(err, ClientError::Contention(_)));
        assert_eq!(store.counter(), 10);
    }

    #[tokio::test]
    async fn test_catalog_failure_injection() {
        let store = MemoryStore::new().with_catalog(&[SkuRow::new("A039", "34B", "BLK")]);
        assert!(store.catalog_rows().await.unwrap().is_array());
        store.fail_catalog(true);
        assert!(store.catalog_rows().await.unwrap_err().is_network());
        assert_eq!(store.calls().catalog_rows, 2);
    }
}
