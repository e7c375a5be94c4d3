//! Order submission
//!
//! A submission allocates the next reference number from the remote counter,
//! then stores the order under `pendingOrders/<referenceNumber>`. The cart is
//! only borrowed; clearing it after a successful submission is up to the
//! caller.

use crate::ClientError;
use crate::cart::Cart;
use crate::remote::RemoteStore;
use shared::{AppError, ErrorCode, Order, OrderStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Order submission errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Party name is required")]
    MissingParty,

    #[error("An order is already being placed")]
    SubmissionInProgress,

    /// No reference number was consumed
    #[error("Could not allocate a reference number: {0}")]
    Counter(#[source] ClientError),

    /// The reference number was consumed but the order was not stored
    #[error("Could not store order {reference}: {source}")]
    OrderWrite {
        reference: String,
        #[source]
        source: ClientError,
    },
}

impl OrderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::EmptyCart => ErrorCode::EmptyCart,
            OrderError::MissingParty => ErrorCode::ValidationFailed,
            OrderError::SubmissionInProgress => ErrorCode::SubmissionInProgress,
            OrderError::Counter(_) => ErrorCode::CounterContention,
            OrderError::OrderWrite { .. } => ErrorCode::OrderWriteFailed,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let app = AppError::with_message(err.code(), err.to_string());
        match &err {
            OrderError::OrderWrite { reference, .. } => {
                app.with_detail("reference_number", reference.as_str())
            }
            _ => app,
        }
    }
}

/// Clears the in-flight flag when the submission ends, including when the
/// future is dropped mid-flight
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Submits carts as orders
pub struct OrderService<R> {
    remote: Arc<R>,
    in_flight: AtomicBool,
}

impl<R: RemoteStore> OrderService<R> {
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Submit the cart as a new order
    ///
    /// An empty cart is rejected before any remote call. A counter failure
    /// consumes no number; a write failure after the increment leaves that
    /// number unused.
    pub async fn submit_order(
        &self,
        cart: &Cart,
        party_name: &str,
        note: &str,
    ) -> Result<Order, OrderError> {
        let total_quantity = cart.total_quantity();
        if total_quantity == 0 {
            return Err(OrderError::EmptyCart);
        }
        let party_name = party_name.trim();
        if party_name.is_empty() {
            return Err(OrderError::MissingParty);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(party = %party_name, "Rejected concurrent order submission");
            return Err(OrderError::SubmissionInProgress);
        }
        let _guard = InFlight(&self.in_flight);

        let counter = self.remote.increment_counter().await.map_err(|e| {
            tracing::error!(error = %e, party = %party_name, "Reference number allocation failed");
            OrderError::Counter(e)
        })?;
        let reference = Order::format_reference(counter);

        let order = Order {
            reference_number: reference.clone(),
            party_name: party_name.to_string(),
            date_time: shared::util::now_iso(),
            items: cart.snapshot(),
            status: OrderStatus::ApprovalPending,
            total_quantity,
            order_note: note.trim().to_string(),
        };

        if let Err(e) = self.remote.create_order(&order).await {
            tracing::error!(
                error = %e,
                reference = %reference,
                party = %party_name,
                "Order write failed, reference number left unused"
            );
            return Err(OrderError::OrderWrite {
                reference,
                source: e,
            });
        }

        let resource = format!("order:{}", reference);
        let details = format!("total_quantity={} lines={}", total_quantity, order.items.len());
        crate::audit_log!(party_name, "submit_order", resource.as_str(), details.as_str());
        tracing::info!(reference = %reference, total_quantity, "Order submitted");

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryStore;
    use std::collections::BTreeMap;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        let selection = BTreeMap::from([(
            "BLK".to_string(),
            BTreeMap::from([("34B".to_string(), 2), ("36B".to_string(), 1)]),
        )]);
        cart.add_to_cart("A039", &selection).unwrap();
        cart
    }

    #[tokio::test]
    async fn test_submit_builds_order() {
        let store = Arc::new(MemoryStore::new().with_counter(41));
        let service = OrderService::new(store.clone());

        let order = service
            .submit_order(&cart(), " Mehta Stores ", " deliver Monday ")
            .await
            .unwrap();

        assert_eq!(order.reference_number, "042");
        assert_eq!(order.party_name, "Mehta Stores");
        assert_eq!(order.order_note, "deliver Monday");
        assert_eq!(order.total_quantity, 3);
        assert_eq!(order.status, OrderStatus::ApprovalPending);
        assert!(order.date_time.ends_with('Z'));
        assert_eq!(store.order("042"), Some(order));
        assert!(!service.is_submitting());
    }

    #[tokio::test]
    async fn test_missing_party_rejected_locally() {
        let store = Arc::new(MemoryStore::new());
        let service = OrderService::new(store.clone());
        let err = service.submit_order(&cart(), "  ", "").await.unwrap_err();
        assert!(matches!(err, OrderError::MissingParty));
        assert_eq!(store.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_guard_released_after_failure() {
        let store = Arc::new(MemoryStore::new());
        store.fail_counter(true);
        let service = OrderService::new(store.clone());

        assert!(service.submit_order(&cart(), "P", "").await.is_err());
        assert!(!service.is_submitting());

        store.fail_counter(false);
        assert_eq!(
            service.submit_order(&cart(), "P", "").await.unwrap().reference_number,
            "001"
        );
    }

    #[test]
    fn test_error_mapping() {
        let err = OrderError::OrderWrite {
            reference: "007".into(),
            source: ClientError::AlreadyExists("pendingOrders/007".into()),
        };
        assert!(err.is_retryable());
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::OrderWriteFailed);
        assert_eq!(app.details.unwrap()["reference_number"], "007");

        assert!(!OrderError::EmptyCart.is_retryable());
    }
}
