//! redb-backed catalog cache
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `items` | style name | JSON-serialized `CatalogItem` | Cached catalog |
//! | `metadata` | `"lastSync"` | `i64` (ms since epoch) | Time of the last successful sync |
//!
//! A sync replaces the whole `items` table and the `lastSync` record in one
//! write transaction, so readers see either the previous catalog or the new
//! one, never a mix.

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use shared::{CatalogItem, ErrorCode};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = style name, value = JSON-serialized CatalogItem
const ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("items");

/// key = metadata name, value = i64
const METADATA_TABLE: TableDefinition<&str, i64> = TableDefinition::new("metadata");

const LAST_SYNC_KEY: &str = "lastSync";

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::CacheUnavailable
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Local catalog cache
#[derive(Clone)]
pub struct CatalogCache {
    db: Arc<Database>,
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache").finish_non_exhaustive()
    }
}

impl CatalogCache {
    /// Open or create the cache file, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Database::create(path)?)
    }

    /// Open an in-memory cache (tests, throwaway sessions)
    pub fn open_in_memory() -> CacheResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> CacheResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ITEMS_TABLE)?;
            let _ = write_txn.open_table(METADATA_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Replace every cached item and record the sync time, atomically
    pub fn replace_all(&self, items: &[CatalogItem], synced_at: i64) -> CacheResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ITEMS_TABLE)?;
            table.retain(|_, _| false)?;
            for item in items {
                let bytes = serde_json::to_vec(item)?;
                table.insert(item.name.as_str(), bytes.as_slice())?;
            }

            let mut metadata = write_txn.open_table(METADATA_TABLE)?;
            metadata.insert(LAST_SYNC_KEY, synced_at)?;
        }
        // Dropping an uncommitted transaction aborts it
        write_txn.commit()?;

        tracing::debug!(count = items.len(), synced_at, "Catalog cache replaced");
        Ok(())
    }

    /// All cached items, ordered by style name
    pub fn read_all(&self) -> CacheResult<Vec<CatalogItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS_TABLE)?;

        let mut items = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }

    pub fn get(&self, style: &str) -> CacheResult<Option<CatalogItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS_TABLE)?;
        match table.get(style)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn item_count(&self) -> CacheResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS_TABLE)?;
        Ok(table.len()?)
    }

    /// Time of the last successful sync, if any
    pub fn last_sync(&self) -> CacheResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(METADATA_TABLE)?;
        Ok(table.get(LAST_SYNC_KEY)?.map(|guard| guard.value()))
    }
}
