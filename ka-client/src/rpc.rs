//! Auth RPC client
//!
//! The auth endpoint takes a POSTed `{ "action": ..., ...params }` object and
//! answers with an [`RpcResponse`].

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::{RpcResponse, UserSession};
use std::time::Duration;

/// Login operations
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Send a one-time password to the email; returns the server's message
    async fn generate_otp(&self, email: &str) -> ClientResult<String>;

    /// Exchange the OTP for a session
    async fn verify_otp(&self, email: &str, otp: &str) -> ClientResult<UserSession>;

    /// Whether the server still accepts the session token
    async fn check_session(&self, email: &str, session_token: &str) -> ClientResult<bool>;
}

/// HTTP client for the auth RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    url: String,
}

impl RpcClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            url: config.rpc_url.clone(),
        })
    }

    async fn call<T: DeserializeOwned>(&self, body: Value) -> ClientResult<RpcResponse<T>> {
        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl AuthApi for RpcClient {
    async fn generate_otp(&self, email: &str) -> ClientResult<String> {
        let response: RpcResponse<Value> = self
            .call(json!({ "action": "generateOTP", "email": email }))
            .await?;
        let message = response.message.clone();
        response.into_result().map_err(ClientError::Rejected)?;
        Ok(message)
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> ClientResult<UserSession> {
        let response: RpcResponse<UserSession> = self
            .call(json!({ "action": "verifyOTP", "email": email, "otp": otp }))
            .await?;
        response
            .into_result()
            .map_err(ClientError::Rejected)?
            .ok_or_else(|| ClientError::InvalidResponse("Missing session data".to_string()))
    }

    async fn check_session(&self, email: &str, session_token: &str) -> ClientResult<bool> {
        let response: RpcResponse<Value> = self
            .call(json!({
                "action": "checkSession",
                "email": email,
                "sessionToken": session_token,
            }))
            .await?;
        Ok(response.success)
    }
}
