//! Tests for the RPC transport and APIs.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gxc_primitives::ec::PrivateKey;
use gxc_transaction::config::ChainConfig;
use gxc_transaction::operation::TransferOperation;
use gxc_transaction::types::{AssetAmount, ObjectId, Time};
use gxc_transaction::{SignedTransaction, Transaction};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use crate::broadcast::{BroadcastApi, Broadcaster};
use crate::database::DatabaseApi;
use crate::error::RpcError;
use crate::transport::{Capabilities, HttpTransport, Transport};
use crate::types::{DynamicGlobalProperties, RpcConfig};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn signed_tx() -> SignedTransaction {
    let key = PrivateKey::from_brain_key("rpc test signer", 0).unwrap();
    let mut tx = Transaction::new();
    tx.ref_block_num = 42;
    tx.ref_block_prefix = 0x0102_0304;
    tx.expiration = Time::from_unix(1_600_000_600);
    tx.push_operation(TransferOperation::new(
        ObjectId::account(100),
        ObjectId::account(200),
        AssetAmount::new(1_000, ObjectId::asset(1)),
        AssetAmount::new(10, ObjectId::asset(0)),
        None,
    ));
    tx.sign(&[&key], &[9u8; 32]).unwrap()
}

fn http_transport(server: &MockServer) -> Arc<HttpTransport> {
    Arc::new(
        HttpTransport::new(&RpcConfig {
            url: server.uri(),
            ..Default::default()
        })
        .unwrap(),
    )
}

/// Matches a JSON-RPC request by method and leading params.
struct RpcCall {
    method: &'static str,
    leading_params: Vec<Value>,
}

impl Match for RpcCall {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        let Some(params) = body["params"].as_array() else {
            return false;
        };
        body["jsonrpc"] == "2.0"
            && body["method"] == self.method
            && params.len() >= self.leading_params.len()
            && params.iter().zip(&self.leading_params).all(|(a, b)| a == b)
    }
}

fn rpc_call(method: &'static str, leading_params: Vec<Value>) -> RpcCall {
    RpcCall {
        method,
        leading_params,
    }
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"id": 1, "jsonrpc": "2.0", "result": result}))
}

// -----------------------------------------------------------------------
// Broadcast over HTTP (nested `call` form)
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_broadcast_uses_nested_call() {
    init_tracing();
    let server = MockServer::start().await;
    let tx = signed_tx();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/json"))
        .and(rpc_call("call", vec![json!(2), json!("broadcast_transaction")]))
        .respond_with(rpc_result(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let api = BroadcastApi::new(http_transport(&server), 2);
    let id = api.broadcast(&tx).await.unwrap();
    assert_eq!(id, tx.id().unwrap());

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let sent = &body["params"][2][0];
    assert_eq!(sent["signatures"][0], tx.signatures()[0].to_hex());
    assert_eq!(sent["ref_block_num"], 42);
    assert_eq!(sent["operations"][0][0], 0);
}

#[tokio::test]
async fn test_broadcast_synchronous() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(rpc_call(
            "call",
            vec![json!(2), json!("broadcast_transaction_synchronous")],
        ))
        .respond_with(rpc_result(json!({
            "id": "2c1f3a9b0e",
            "block_num": 123456,
            "trx_num": 3,
            "expired": false
        })))
        .mount(&server)
        .await;

    let api = BroadcastApi::new(http_transport(&server), 2);
    let resp = api.broadcast_transaction_synchronous(&signed_tx()).await.unwrap();
    assert_eq!(resp.id, "2c1f3a9b0e");
    assert_eq!(resp.block_num, 123456);
    assert_eq!(resp.trx_num, 3);
    assert!(!resp.expired);
}

#[tokio::test]
async fn test_remote_error() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "jsonrpc": "2.0",
            "error": {"code": 1, "message": "missing required active authority", "data": {}}
        })))
        .mount(&server)
        .await;

    let api = BroadcastApi::new(http_transport(&server), 2);
    match api.broadcast_transaction(&signed_tx()).await {
        Err(RpcError::Remote { code, message }) => {
            assert_eq!(code, 1);
            assert!(message.contains("active authority"));
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let api = BroadcastApi::new(http_transport(&server), 2);
    let err = api.broadcast_transaction(&signed_tx()).await.unwrap_err();
    assert!(matches!(err, RpcError::UnexpectedStatus(502)));
}

#[tokio::test]
async fn test_malformed_response_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let transport = http_transport(&server);
    let err = transport.call("get_chain_id", Vec::new()).await.unwrap_err();
    assert!(matches!(err, RpcError::Json(_)));
}

// -----------------------------------------------------------------------
// Transport state
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_request_ids_are_per_transport() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("ok")))
        .mount(&server)
        .await;

    let first = http_transport(&server);
    let second = http_transport(&server);
    first.call("a", Vec::new()).await.unwrap();
    first.call("b", Vec::new()).await.unwrap();
    second.call("c", Vec::new()).await.unwrap();

    let ids: Vec<(String, u64)> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            (
                body["method"].as_str().unwrap().to_string(),
                body["id"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        ids,
        vec![("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 1)]
    );
}

#[test]
fn test_http_transport_needs_nested_calls() {
    let transport = HttpTransport::new(&RpcConfig::default()).unwrap();
    assert!(transport.capabilities().nested_api_calls);
    assert_eq!(transport.url(), "http://127.0.0.1:8090");
}

// -----------------------------------------------------------------------
// Direct form on transports that route API methods themselves
// -----------------------------------------------------------------------

#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    result: Value,
}

#[async_trait]
impl Transport for RecordingTransport {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.calls.lock().unwrap().push((method.to_string(), params));
        Ok(self.result.clone())
    }
}

#[tokio::test]
async fn test_broadcast_direct_form() {
    let transport = Arc::new(RecordingTransport::default());
    let api = BroadcastApi::new(transport.clone(), 2);
    let tx = signed_tx();
    api.broadcast_transaction(&tx).await.unwrap();

    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "broadcast_transaction");
    assert_eq!(calls[0].1, vec![serde_json::to_value(&tx).unwrap()]);
}

#[tokio::test]
async fn test_database_direct_form() {
    let transport = Arc::new(RecordingTransport {
        result: json!("903b5011248e2ea7c6f3104dbeca154b522f47de90dc5a44f08a79662fde40cb"),
        ..Default::default()
    });
    let api = DatabaseApi::new(transport.clone(), 0);
    let chain_id = api.get_chain_id().await.unwrap();
    assert_eq!(chain_id.len(), 64);
    assert_eq!(transport.calls.lock().unwrap()[0], ("get_chain_id".to_string(), Vec::new()));
}

// -----------------------------------------------------------------------
// Database API
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_get_dynamic_global_properties() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(rpc_call(
            "call",
            vec![json!(0), json!("get_dynamic_global_properties"), json!([])],
        ))
        .respond_with(rpc_result(json!({
            "id": "2.1.0",
            "head_block_number": 0x0001_8707u32,
            "head_block_id": "00018707a1b2c3d4e5f60718293a4b5c6d7e8f90",
            "time": "2019-01-01T00:00:00",
            "current_witness": "1.6.5"
        })))
        .mount(&server)
        .await;

    let api = DatabaseApi::new(http_transport(&server), 0);
    let props = api.get_dynamic_global_properties().await.unwrap();
    assert_eq!(props.head_block_number, 0x0001_8707);

    let mut tx = Transaction::new();
    props.apply_to(&mut tx, &ChainConfig::default()).unwrap();
    assert_eq!(tx.ref_block_num, 0x8707);
    assert_eq!(tx.ref_block_prefix, 0xd4c3_b2a1);
    assert_eq!(tx.expiration.to_string(), "2019-01-01T00:10:00");
}

#[test]
fn test_apply_to_rejects_bad_block_id() {
    let props = DynamicGlobalProperties {
        head_block_number: 1,
        head_block_id: "abcd".to_string(),
        time: Time::from_unix(0),
    };
    let mut tx = Transaction::new();
    assert!(props.apply_to(&mut tx, &ChainConfig::default()).is_err());
}

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

#[test]
fn test_config_defaults() {
    let config = RpcConfig::default();
    assert_eq!(config.timeout_secs, 20);
    assert_eq!(config.broadcast_api_id, 2);
    assert_eq!(config.database_api_id, 0);
}

#[test]
fn test_config_from_partial_json() {
    let config: RpcConfig =
        serde_json::from_str(r#"{"url":"https://node.example.com","timeout_secs":5}"#).unwrap();
    assert_eq!(config.url, "https://node.example.com");
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.broadcast_api_id, 2);
}
