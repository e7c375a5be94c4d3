//! REST-backed realtime database store

use super::{MAX_TRANSACTION_RETRIES, RemoteStore, StorePaths, counter_value, marker_value};
use crate::http::{ConditionalWrite, HttpClient, NULL_ETAG};
use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use serde_json::Value;
use shared::Order;

/// [`RemoteStore`] over the realtime database REST API
#[derive(Debug, Clone)]
pub struct RealtimeStore {
    http: HttpClient,
    paths: StorePaths,
}

impl RealtimeStore {
    pub fn new(http: HttpClient, paths: StorePaths) -> Self {
        Self { http, paths }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(HttpClient::new(config)?, config.paths.clone()))
    }
}

#[async_trait]
impl RemoteStore for RealtimeStore {
    async fn catalog_rows(&self) -> ClientResult<Value> {
        self.http.get_value(&self.paths.catalog_items).await
    }

    async fn catalog_last_modified(&self) -> ClientResult<i64> {
        let value = self.http.get_value(&self.paths.catalog_last_modified).await?;
        marker_value(&value).ok_or_else(|| {
            ClientError::InvalidResponse(format!("lastModified is not a number: {}", value))
        })
    }

    async fn increment_counter(&self) -> ClientResult<u64> {
        let path = &self.paths.reference_counter;
        let (initial, mut etag) = self.http.get_with_etag(path).await?;
        // A missing node starts the sequence at 0
        let mut value = counter_value(&initial).ok_or_else(|| {
            ClientError::InvalidResponse(format!("Counter is not a number: {}", initial))
        })?;

        for attempt in 1..=MAX_TRANSACTION_RETRIES {
            let next = value + 1;

            match self.http.put_if_match(path, &next, &etag).await? {
                ConditionalWrite::Written => {
                    tracing::debug!(path = %path, value = next, attempt, "Counter incremented");
                    return Ok(next);
                }
                ConditionalWrite::Conflict {
                    etag: fresh_etag,
                    current,
                } => {
                    // Another writer stored a number in between
                    value = current.as_u64().ok_or_else(|| {
                        ClientError::InvalidResponse(format!(
                            "Counter is not a number after conflict: {}",
                            current
                        ))
                    })?;
                    tracing::debug!(path = %path, attempt, value, "Counter changed concurrently, retrying");
                    etag = fresh_etag;
                }
            }
        }

        tracing::warn!(path = %path, attempts = MAX_TRANSACTION_RETRIES, "Counter transaction gave up");
        Err(ClientError::Contention(path.clone()))
    }

    async fn create_order(&self, order: &Order) -> ClientResult<()> {
        let path = self.paths.order_path(&order.reference_number);
        match self.http.put_if_match(&path, order, NULL_ETAG).await? {
            ConditionalWrite::Written => Ok(()),
            ConditionalWrite::Conflict { .. } => Err(ClientError::AlreadyExists(path)),
        }
    }
}
