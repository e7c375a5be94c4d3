//! Reference number allocation and order submission

use ka_client::order::{OrderError, OrderService};
use ka_client::remote::MAX_TRANSACTION_RETRIES;
use ka_client::{AppError, Cart, ErrorCode, MemoryStore, RemoteStore};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::task::JoinSet;

fn cart() -> Cart {
    let mut cart = Cart::new();
    cart.add_to_cart(
        "A039",
        &BTreeMap::from([(
            "BLK".to_string(),
            BTreeMap::from([("32B".to_string(), 2), ("34B".to_string(), 1)]),
        )]),
    )
    .unwrap();
    cart.add_to_cart(
        "F074",
        &BTreeMap::from([("SKN".to_string(), BTreeMap::from([("M".to_string(), 4)]))]),
    )
    .unwrap();
    cart
}

#[tokio::test]
async fn test_concurrent_increments_get_distinct_values() {
    let store = MemoryStore::new().with_counter(5);

    let (a, b) = tokio::join!(store.increment_counter(), store.increment_counter());
    let got = BTreeSet::from([a.unwrap(), b.unwrap()]);

    assert_eq!(got, BTreeSet::from([6, 7]));
    assert_eq!(store.counter(), 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_increments_across_threads_are_distinct() {
    let store = Arc::new(MemoryStore::new());
    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let store = store.clone();
        tasks.spawn(async move { store.increment_counter().await });
    }

    let mut got = BTreeSet::new();
    while let Some(result) = tasks.join_next().await {
        assert!(got.insert(result.unwrap().unwrap()));
    }

    assert_eq!(got, (1..=16).collect::<BTreeSet<u64>>());
    assert_eq!(store.counter(), 16);
}

#[tokio::test]
async fn test_two_clients_get_consecutive_references() {
    let store = Arc::new(MemoryStore::new().with_counter(5));
    let first = OrderService::new(store.clone());
    let second = OrderService::new(store.clone());
    let cart = cart();

    let (a, b) = tokio::join!(
        first.submit_order(&cart, "Mehta Stores", ""),
        second.submit_order(&cart, "Shah Traders", ""),
    );
    let refs = BTreeSet::from([a.unwrap().reference_number, b.unwrap().reference_number]);

    assert_eq!(refs, BTreeSet::from(["006".to_string(), "007".to_string()]));
    assert_eq!(store.order_count(), 2);
}

#[tokio::test]
async fn test_double_submit_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let service = OrderService::new(store.clone());
    let cart = cart();

    let (a, b) = tokio::join!(
        service.submit_order(&cart, "Mehta Stores", ""),
        service.submit_order(&cart, "Mehta Stores", ""),
    );

    assert_eq!(a.unwrap().reference_number, "001");
    assert!(matches!(b, Err(OrderError::SubmissionInProgress)));
    assert_eq!(store.counter(), 1);
    assert_eq!(store.order_count(), 1);
    assert!(!service.is_submitting());
}

#[tokio::test]
async fn test_empty_cart_makes_no_remote_calls() {
    let store = Arc::new(MemoryStore::new().with_counter(5));
    let service = OrderService::new(store.clone());

    let err = service
        .submit_order(&Cart::new(), "Mehta Stores", "")
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::EmptyCart));
    assert_eq!(err.code(), ErrorCode::EmptyCart);
    assert_eq!(store.calls().total(), 0);
    assert_eq!(store.counter(), 5);
}

#[tokio::test]
async fn test_counter_failure_consumes_nothing() {
    let store = Arc::new(MemoryStore::new().with_counter(5));
    let service = OrderService::new(store.clone());
    let cart = cart();
    let before = cart.clone();

    store.fail_counter(true);
    let err = service.submit_order(&cart, "Mehta Stores", "").await.unwrap_err();
    assert!(matches!(err, OrderError::Counter(_)));
    assert!(err.is_retryable());
    assert_eq!(store.counter(), 5);
    assert_eq!(store.calls().create_order, 0);
    assert_eq!(cart, before);
}

#[tokio::test]
async fn test_exhausted_contention_consumes_nothing() {
    let store = Arc::new(MemoryStore::new().with_counter(5));
    let service = OrderService::new(store.clone());

    store.inject_conflicts(MAX_TRANSACTION_RETRIES);
    let err = service.submit_order(&cart(), "Mehta Stores", "").await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::CounterContention);
    assert!(err.is_retryable());
    assert_eq!(store.counter(), 5);

    let order = service.submit_order(&cart(), "Mehta Stores", "").await.unwrap();
    assert_eq!(order.reference_number, "006");
}

#[tokio::test]
async fn test_order_write_failure_burns_the_number() {
    let store = Arc::new(MemoryStore::new().with_counter(5));
    let service = OrderService::new(store.clone());
    let cart = cart();

    store.fail_order(true);
    let err = service.submit_order(&cart, "Mehta Stores", "").await.unwrap_err();
    match &err {
        OrderError::OrderWrite { reference, .. } => assert_eq!(reference, "006"),
        other => panic!("expected write failure, got {:?}", other),
    }
    assert_eq!(store.counter(), 6);
    assert_eq!(store.order_count(), 0);
    assert_eq!(cart.total_quantity(), 7);

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::OrderWriteFailed);

    store.fail_order(false);
    let order = service.submit_order(&cart, "Mehta Stores", "").await.unwrap();
    assert_eq!(order.reference_number, "007");
    assert!(store.order("006").is_none());
}

#[tokio::test]
async fn test_reference_grows_past_three_digits() {
    let store = Arc::new(MemoryStore::new().with_counter(999));
    let service = OrderService::new(store.clone());

    let order = service.submit_order(&cart(), "Mehta Stores", "").await.unwrap();
    assert_eq!(order.reference_number, "1000");
}

#[tokio::test]
async fn test_stored_order_matches_cart() {
    let store = Arc::new(MemoryStore::new().with_counter(6));
    let service = OrderService::new(store.clone());
    let cart = cart();

    let order = service
        .submit_order(&cart, "Mehta Stores", "urgent")
        .await
        .unwrap();

    let stored = store.order("007").unwrap();
    assert_eq!(stored, order);
    assert_eq!(stored.items, cart.snapshot());
    assert_eq!(stored.total_quantity, 7);
    assert_eq!(stored.order_note, "urgent");

    let message = stored.share_message();
    assert!(message.starts_with("Kindly find the attached order of Mehta Stores"));
    assert!(message.contains("A039\nBLK - 32B / 2\nBLK - 34B / 1\n"));
    assert!(message.contains("F074\nSKN - M / 4\n"));
    assert!(message.ends_with("TOTAL: 7"));
}
