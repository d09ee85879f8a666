//! RPC configuration, wire envelopes and response structures.

use gxc_transaction::config::ChainConfig;
use gxc_transaction::types::Time;
use gxc_transaction::{Transaction, TransactionError};
use serde::{Deserialize, Serialize};

/// Configuration for an [`HttpTransport`](crate::HttpTransport) and the APIs on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Node endpoint.
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Api id of the network broadcast API for nested `call` requests.
    pub broadcast_api_id: u32,
    /// Api id of the database API for nested `call` requests.
    pub database_api_id: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8090".to_string(),
            timeout_secs: 20,
            broadcast_api_id: 2,
            database_api_id: 0,
        }
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [serde_json::Value],
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RemoteError>,
}

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RemoteError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Result of `broadcast_transaction_synchronous`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    /// Transaction id.
    pub id: String,
    /// Block that included the transaction.
    pub block_num: u32,
    /// Position of the transaction inside the block.
    pub trx_num: u32,
    /// Whether the transaction expired before inclusion.
    #[serde(default)]
    pub expired: bool,
}

/// The subset of `get_dynamic_global_properties` needed to build transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicGlobalProperties {
    /// Height of the head block.
    pub head_block_number: u32,
    /// Hex id of the head block.
    pub head_block_id: String,
    /// Timestamp of the head block.
    pub time: Time,
}

impl DynamicGlobalProperties {
    /// Reference the head block from `tx` and set its expiration from the
    /// head block time.
    pub fn apply_to(&self, tx: &mut Transaction, config: &ChainConfig) -> Result<(), TransactionError> {
        tx.set_reference_block(self.head_block_number, &self.head_block_id)?;
        tx.set_expiration(self.time, config);
        Ok(())
    }
}
