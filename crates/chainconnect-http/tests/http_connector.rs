//! End-to-end tests against a local mock JSON-RPC node.

use alloy_primitives::U256;
use chainconnect_core::{
    ConnectionStatus, Connector, ConnectorError, EventHandler, MethodResult, Provider,
    ProviderConnector,
};
use chainconnect_http::{http_connector, HttpTransport, HttpTransportConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADDR: &str = "0x0000000000000000000000000000000000000001";

fn result(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": value}))
}

async fn answer(server: &MockServer, rpc_method: &str, value: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": rpc_method})))
        .respond_with(result(value))
        .mount(server)
        .await;
}

#[tokio::test]
async fn chain_id_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"id": 1, "jsonrpc": "2.0", "method": "eth_chainId", "params": []})))
        .respond_with(result(json!("0x1")))
        .expect(1)
        .mount(&server)
        .await;

    let connector = http_connector(server.uri()).unwrap();
    let chain_id = connector.request("eth_chainId", vec![]).await.unwrap();
    assert_eq!(chain_id, MethodResult::Quantity(U256::from(1)));
}

#[tokio::test]
async fn invalid_params_never_hit_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(result(json!("0x1")))
        .expect(0)
        .mount(&server)
        .await;

    let connector = http_connector(server.uri()).unwrap();
    let err = connector
        .request("eth_blockNumber", vec![json!("latest")])
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::InvalidParams { .. }));
}

#[tokio::test]
async fn error_envelope_in_non_2xx_body_is_rpc_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "boom"}
        })))
        .mount(&server)
        .await;

    let connector = http_connector(server.uri()).unwrap();
    let err = connector
        .request("eth_getBalance", vec![json!(ADDR)])
        .await
        .unwrap_err();
    assert_eq!(err.rpc_code(), Some(-32000));
}

#[tokio::test]
async fn non_json_body_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let connector = http_connector(server.uri()).unwrap();
    let err = connector.request("eth_gasPrice", vec![]).await.unwrap_err();
    assert!(matches!(err, ConnectorError::Transport(_)), "{err}");
}

#[tokio::test]
async fn block_numbers_are_sent_as_hex() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBalance", "params": [ADDR, "0x10"]})))
        .respond_with(result(json!("0xde0b6b3a7640000")))
        .expect(1)
        .mount(&server)
        .await;

    let connector = http_connector(server.uri()).unwrap();
    let balance = connector
        .request("eth_getBalance", vec![json!(ADDR), json!(16)])
        .await
        .unwrap();
    assert_eq!(
        balance.as_quantity(),
        Some(U256::from(1_000_000_000_000_000_000u64))
    );
}

#[tokio::test]
async fn configured_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-api-key", "secret"))
        .respond_with(result(json!("1")))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpTransportConfig::new(server.uri()).with_header("x-api-key", "secret");
    let transport = HttpTransport::new(config).unwrap();
    let connector = Connector::new(Arc::new(transport));
    let version = connector.request("net_version", vec![]).await.unwrap();
    assert_eq!(version, MethodResult::Text("1".into()));
}

#[tokio::test]
async fn subscribe_is_not_implemented_over_http() {
    let connector = http_connector("http://127.0.0.1:8545").unwrap();
    let err = connector
        .subscribe(EventHandler::connected_accounts(|_| {}))
        .unwrap_err();
    assert!(matches!(err, ConnectorError::NotImplemented { .. }));
}

#[tokio::test]
async fn provider_snapshot_without_accounts_support_is_disconnected() {
    let server = MockServer::start().await;
    answer(&server, "eth_chainId", json!("0x1")).await;
    answer(&server, "eth_blockNumber", json!("0x10")).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_accounts"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "method not found"}
        })))
        .mount(&server)
        .await;

    let provider = Provider::create(Arc::new(http_connector(server.uri()).unwrap())).await;
    assert_eq!(provider.status(), ConnectionStatus::Disconnected);
    assert_eq!(provider.chain_id(), None);
}
