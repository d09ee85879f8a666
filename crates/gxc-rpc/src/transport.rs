//! Transport abstraction and the HTTP JSON-RPC implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RpcError;
use crate::types::{RpcConfig, RpcRequest, RpcResponse};

/// What a transport can do beyond plain method calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// API methods must be wrapped as `call(api_id, method, params)`
    /// because the endpoint does not route them directly.
    pub nested_api_calls: bool,
}

/// A JSON-RPC connection to a node.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Features of this transport that change how APIs phrase requests.
    fn capabilities(&self) -> Capabilities;

    /// Invoke `method` with positional `params` and return the raw result.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

/// Call `method` and deserialize its result into `T`.
pub async fn call_as<T: DeserializeOwned>(
    transport: &dyn Transport,
    method: &str,
    params: Vec<Value>,
) -> Result<T, RpcError> {
    let result = transport.call(method, params).await?;
    Ok(serde_json::from_value(result)?)
}

/// JSON-RPC over HTTP POST.
///
/// Each instance owns its request id counter. HTTP endpoints only route
/// `call`, so [`Capabilities::nested_api_calls`] is set.
#[derive(Debug)]
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
    request_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint and timeout.
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            url: config.url.clone(),
            client,
            request_id: AtomicU64::new(0),
        })
    }

    /// The endpoint this transport posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            nested_api_calls: true,
        }
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_request_id();
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params: &params,
        };
        tracing::debug!(id, method, url = %self.url, "rpc request");

        let resp = self.client.post(&self.url).json(&request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(id, method, status = status.as_u16(), "rpc request failed");
            return Err(RpcError::UnexpectedStatus(status.as_u16()));
        }

        let body = resp.bytes().await?;
        let response: RpcResponse = serde_json::from_slice(&body)?;
        if response.id.is_some_and(|rid| rid != id) {
            tracing::debug!(id, response_id = ?response.id, "response id does not match request");
        }
        if let Some(err) = response.error {
            tracing::warn!(id, method, code = err.code, message = %err.message, "remote error");
            return Err(RpcError::Remote {
                code: err.code,
                message: err.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}
