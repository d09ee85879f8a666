//! The network broadcast API.

use std::sync::Arc;

use async_trait::async_trait;
use gxc_transaction::SignedTransaction;
use serde_json::{json, Value};

use crate::error::RpcError;
use crate::transport::Transport;
use crate::types::BroadcastResponse;

/// Something that can submit a signed transaction to the network.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Submit `tx` and return its id once the node has accepted it.
    async fn broadcast(&self, tx: &SignedTransaction) -> Result<String, RpcError>;
}

/// Typed access to `broadcast_transaction` and
/// `broadcast_transaction_synchronous`.
#[derive(Clone)]
pub struct BroadcastApi {
    transport: Arc<dyn Transport>,
    api_id: u32,
}

impl BroadcastApi {
    /// Wrap a transport. `api_id` is only used when the transport needs
    /// nested `call` requests.
    pub fn new(transport: Arc<dyn Transport>, api_id: u32) -> Self {
        Self { transport, api_id }
    }

    /// Submit a transaction without waiting for inclusion.
    pub async fn broadcast_transaction(&self, tx: &SignedTransaction) -> Result<(), RpcError> {
        self.invoke("broadcast_transaction", tx).await?;
        Ok(())
    }

    /// Submit a transaction and wait until it is included in a block.
    pub async fn broadcast_transaction_synchronous(
        &self,
        tx: &SignedTransaction,
    ) -> Result<BroadcastResponse, RpcError> {
        let result = self.invoke("broadcast_transaction_synchronous", tx).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn invoke(&self, method: &str, tx: &SignedTransaction) -> Result<Value, RpcError> {
        let tx = serde_json::to_value(tx)?;
        if self.transport.capabilities().nested_api_calls {
            self.transport
                .call("call", vec![json!(self.api_id), json!(method), json!([tx])])
                .await
        } else {
            self.transport.call(method, vec![tx]).await
        }
    }
}

#[async_trait]
impl Broadcaster for BroadcastApi {
    async fn broadcast(&self, tx: &SignedTransaction) -> Result<String, RpcError> {
        let id = tx.id()?;
        self.broadcast_transaction(tx).await?;
        tracing::debug!(%id, "broadcast transaction");
        Ok(id)
    }
}
