//! HTTP client for the realtime database REST API
//!
//! Every node is addressed as `<base>/<path>.json`, with the database token
//! passed in the `auth` query parameter. Conditional writes use the ETag
//! protocol: a read with `X-Firebase-ETag: true` returns the node's ETag, and a
//! write carrying `if-match` is rejected with `412 Precondition Failed` when the
//! node changed in between.

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const ETAG_REQUEST_HEADER: &str = "X-Firebase-ETag";
const IF_MATCH_HEADER: &str = "if-match";

/// ETag the server reports for a node that does not exist
pub const NULL_ETAG: &str = "null_etag";

/// Outcome of a conditional write
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalWrite {
    /// Value stored
    Written,
    /// Node changed since the ETag was read; carries the fresh state
    Conflict { etag: String, current: Value },
}

/// Realtime database client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    auth: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.database_url.trim_end_matches('/').to_string(),
            auth: config.database_auth.clone(),
        })
    }

    /// REST URL of a node
    pub fn node_url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(token) => builder.query(&[("auth", token.as_str())]),
            None => builder,
        }
    }

    /// Read a node; absent nodes come back as `Value::Null`
    pub async fn get_value(&self, path: &str) -> ClientResult<Value> {
        let request = self.request(self.client.get(self.node_url(path)));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Read a node together with its ETag
    pub async fn get_with_etag(&self, path: &str) -> ClientResult<(Value, String)> {
        let request = self
            .request(self.client.get(self.node_url(path)))
            .header(ETAG_REQUEST_HEADER, "true");
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        let etag = Self::etag_of(&response)?;
        let value = response.json().await?;
        Ok((value, etag))
    }

    /// Write a node only if its ETag still matches
    ///
    /// Pass [`NULL_ETAG`] to create a node that must not exist yet. A conflict
    /// body that is not JSON is an error, never an empty node.
    pub async fn put_if_match<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        etag: &str,
    ) -> ClientResult<ConditionalWrite> {
        let request = self
            .request(self.client.put(self.node_url(path)))
            .header(IF_MATCH_HEADER, etag)
            .json(body);
        let response = request.send().await?;

        if response.status() == StatusCode::PRECONDITION_FAILED {
            let etag = Self::etag_of(&response)?;
            let current = response.json::<Value>().await?;
            return Ok(ConditionalWrite::Conflict { etag, current });
        }

        let _: Value = Self::handle_response(response).await?;
        Ok(ConditionalWrite::Written)
    }

    fn etag_of(response: &Response) -> ClientResult<String> {
        response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ClientError::InvalidResponse("Missing ETag header".to_string()))
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response.json().await.map_err(Into::into)
    }

    async fn status_error(response: Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ClientError::Status { status, body }
    }
}
