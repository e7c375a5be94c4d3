//! Catalog cache manager against the in-memory remote store

use ka_client::catalog::{CatalogCache, CatalogError, CatalogManager, CatalogSource};
use ka_client::{ErrorCode, MemoryStore, SkuRow};
use serde_json::json;
use std::sync::Arc;

fn two_styles() -> Vec<SkuRow> {
    vec![
        SkuRow::new("F074", "M", "SKN").with_color_name("Skin").with_mrp("499"),
        SkuRow::new("A039", "36B", "BLK").with_color_name("Black").with_mrp("899"),
        SkuRow::new("A039", "34B", "BLK"),
        SkuRow::new("F074", "XS", "BLK"),
    ]
}

fn manager(store: &Arc<MemoryStore>) -> CatalogManager<MemoryStore> {
    CatalogManager::new(store.clone(), CatalogCache::open_in_memory().unwrap())
}

fn names(items: &[ka_client::CatalogItem]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

#[tokio::test]
async fn test_empty_cache_fetches_then_serves_from_cache() {
    let store = Arc::new(MemoryStore::new().with_catalog(&two_styles()).with_last_modified(1_000));
    let manager = manager(&store);

    let first = manager.initialize_items().await.unwrap();
    assert_eq!(first.source, CatalogSource::Remote { persisted: true });
    assert_eq!(names(&first.items), vec!["A039", "F074"]);
    assert_eq!(first.items[0].sizes, vec!["34B", "36B"]);
    assert_eq!(first.items[1].colors, vec!["SKN", "BLK"]);

    assert_eq!(manager.cache().item_count().unwrap(), 2);
    let last_sync = manager.cache().last_sync().unwrap().unwrap();
    assert!(last_sync > 1_000);

    let second = manager.initialize_items().await.unwrap();
    assert_eq!(second.source, CatalogSource::Cache);
    assert_eq!(second.items, first.items);
    assert_eq!(store.calls().catalog_rows, 1);
    assert_eq!(manager.cache().last_sync().unwrap(), Some(last_sync));
}

#[tokio::test]
async fn test_newer_remote_marker_triggers_refetch() {
    let store = Arc::new(MemoryStore::new().with_catalog(&two_styles()));
    let manager = manager(&store);
    manager.initialize_items().await.unwrap();

    let mut rows = two_styles();
    rows.push(SkuRow::new("SB06", "L", "RED"));
    store.set_catalog(&rows);
    store.set_last_modified(shared::util::now_millis() + 60_000);

    let load = manager.initialize_items().await.unwrap();
    assert!(matches!(load.source, CatalogSource::Remote { .. }));
    assert_eq!(names(&load.items), vec!["A039", "F074", "SB06"]);
    assert_eq!(store.calls().catalog_rows, 2);
}

#[tokio::test]
async fn test_unreadable_marker_counts_as_stale() {
    let store = Arc::new(MemoryStore::new().with_catalog(&two_styles()));
    let manager = manager(&store);
    manager.initialize_items().await.unwrap();

    store.fail_marker(true);
    let load = manager.initialize_items().await.unwrap();
    assert!(matches!(load.source, CatalogSource::Remote { .. }));
    assert_eq!(store.calls().catalog_rows, 2);
}

#[tokio::test]
async fn test_fetch_failure_falls_back_to_cache() {
    let store = Arc::new(MemoryStore::new().with_catalog(&two_styles()));
    let manager = manager(&store);
    let fresh = manager.initialize_items().await.unwrap();

    store.set_last_modified(shared::util::now_millis() + 60_000);
    store.fail_catalog(true);

    let load = manager.initialize_items().await.unwrap();
    assert_eq!(load.source, CatalogSource::Fallback);
    assert!(!load.is_fresh());
    assert_eq!(load.items, fresh.items);
}

#[tokio::test]
async fn test_invalid_payload_falls_back_to_cache() {
    let store = Arc::new(MemoryStore::new().with_catalog(&two_styles()));
    let manager = manager(&store);
    manager.initialize_items().await.unwrap();

    store.set_catalog_value(json!({ "Style": "A039" }));
    store.set_last_modified(shared::util::now_millis() + 60_000);

    let load = manager.initialize_items().await.unwrap();
    assert_eq!(load.source, CatalogSource::Fallback);
    assert_eq!(load.items.len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_with_empty_cache_is_hard_failure() {
    let store = Arc::new(MemoryStore::new().with_catalog(&two_styles()));
    store.fail_catalog(true);
    let manager = manager(&store);

    let err = manager.initialize_items().await.unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(_)));
    assert_eq!(err.code(), ErrorCode::CatalogUnavailable);
    assert!(err.code().is_retryable());
    assert_eq!(manager.cache().item_count().unwrap(), 0);
    assert_eq!(manager.cache().last_sync().unwrap(), None);
}

#[tokio::test]
async fn test_empty_remote_with_empty_cache_is_hard_failure() {
    let store = Arc::new(MemoryStore::new());
    let manager = manager(&store);

    match manager.initialize_items().await {
        Err(CatalogError::Unavailable(inner)) => {
            assert!(matches!(*inner, CatalogError::EmptyRemoteData));
        }
        other => panic!("expected hard failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sync_now_failure_leaves_cache_untouched() {
    let store = Arc::new(MemoryStore::new().with_catalog(&two_styles()));
    let manager = manager(&store);
    manager.initialize_items().await.unwrap();
    let before = manager.cache().read_all().unwrap();
    let last_sync = manager.cache().last_sync().unwrap();

    store.set_catalog_value(json!([]));
    let err = manager.sync_now().await.unwrap_err();
    assert!(matches!(err, CatalogError::EmptyRemoteData));

    assert_eq!(manager.cache().read_all().unwrap(), before);
    assert_eq!(manager.cache().last_sync().unwrap(), last_sync);
}

#[tokio::test]
async fn test_sync_now_always_fetches() {
    let store = Arc::new(MemoryStore::new().with_catalog(&two_styles()));
    let manager = manager(&store);
    manager.initialize_items().await.unwrap();

    store.set_catalog(&[SkuRow::new("TS09", "S", "WHT")]);
    let items = manager.sync_now().await.unwrap();
    assert_eq!(names(&items), vec!["TS09"]);
    assert_eq!(names(&manager.cache().read_all().unwrap()), vec!["TS09"]);
    assert_eq!(store.calls().catalog_rows, 2);
}

#[tokio::test]
async fn test_on_disk_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.redb");
    let store = Arc::new(MemoryStore::new().with_catalog(&two_styles()));

    {
        let manager = CatalogManager::new(store.clone(), CatalogCache::open(&path).unwrap());
        manager.initialize_items().await.unwrap();
    }

    let manager = CatalogManager::new(store.clone(), CatalogCache::open(&path).unwrap());
    let load = manager.initialize_items().await.unwrap();
    assert_eq!(load.source, CatalogSource::Cache);
    assert_eq!(load.items.len(), 2);
    assert_eq!(store.calls().catalog_rows, 1);
}
