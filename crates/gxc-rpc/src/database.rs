//! The subset of the database API needed to build and sign transactions.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::RpcError;
use crate::transport::{call_as, Transport};
use crate::types::DynamicGlobalProperties;

/// Typed access to database API queries.
#[derive(Clone)]
pub struct DatabaseApi {
    transport: Arc<dyn Transport>,
    api_id: u32,
}

impl DatabaseApi {
    /// Wrap a transport. `api_id` is only used for nested `call` requests.
    pub fn new(transport: Arc<dyn Transport>, api_id: u32) -> Self {
        Self { transport, api_id }
    }

    /// Hex chain id of the connected network.
    pub async fn get_chain_id(&self) -> Result<String, RpcError> {
        self.query("get_chain_id", Vec::new()).await
    }

    /// Head block number, id and time.
    pub async fn get_dynamic_global_properties(&self) -> Result<DynamicGlobalProperties, RpcError> {
        self.query("get_dynamic_global_properties", Vec::new()).await
    }

    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        if self.transport.capabilities().nested_api_calls {
            call_as(
                self.transport.as_ref(),
                "call",
                vec![json!(self.api_id), json!(method), Value::Array(params)],
            )
            .await
        } else {
            call_as(self.transport.as_ref(), method, params).await
        }
    }
}
