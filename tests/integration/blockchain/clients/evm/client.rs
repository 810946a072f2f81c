use alloy::primitives::{Address, Bytes};
use mockall::predicate;
use serde_json::{json, Value};

use chain_event_listener::{
	services::blockchain::{BlockChainError, ChainClient, EvmClient, LogFilter, TransportError},
	utils::tests::builders::EndpointBuilder,
};

use crate::integration::mocks::MockEVMTransportClient;

fn client_with(
	method: &'static str,
	response: impl Fn(Option<Vec<Value>>) -> Result<Value, TransportError> + Send + 'static,
) -> EvmClient<MockEVMTransportClient> {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(predicate::eq(method), predicate::always())
		.times(1)
		.returning(move |_, params| response(params));
	EvmClient::new_with_transport(transport, &EndpointBuilder::new().slug("bnb_testnet").build())
}

#[tokio::test]
async fn test_get_chain_id() {
	let client = client_with("eth_chainId", |_| {
		Ok(json!({"jsonrpc": "2.0", "id": 1, "result": "0x61"}))
	});
	assert_eq!(client.get_chain_id().await.unwrap(), 97);
}

#[tokio::test]
async fn test_call_sends_latest_and_decodes_data() {
	let to = Address::repeat_byte(0xf0);
	let client = client_with("eth_call", move |params| {
		let params = params.unwrap();
		assert_eq!(params[0]["to"], json!(to));
		assert_eq!(params[0]["data"], "0xdeadbeef");
		assert_eq!(params[1], "latest");
		Ok(json!({"jsonrpc": "2.0", "id": 1, "result": "0x0102"}))
	});

	let result = client
		.call(to, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]))
		.await
		.unwrap();
	assert_eq!(result, Bytes::from(vec![0x01, 0x02]));
}

#[tokio::test]
async fn test_rpc_error_object_is_chain_query_error() {
	let client = client_with("eth_call", |_| {
		Ok(json!({
			"jsonrpc": "2.0",
			"id": 1,
			"error": {"code": -32000, "message": "execution reverted"}
		}))
	});

	let err = client
		.call(Address::ZERO, Bytes::new())
		.await
		.unwrap_err();
	assert!(matches!(err, BlockChainError::ChainQueryError(_)));
	assert!(err.to_string().contains("execution reverted"));
	assert!(err.to_string().contains("endpoint=bnb_testnet"));
}

#[tokio::test]
async fn test_missing_result_is_chain_query_error() {
	let client = client_with("eth_blockNumber", |_| {
		Ok(json!({"jsonrpc": "2.0", "id": 1, "result": null}))
	});

	let err = client.get_latest_block_number().await.unwrap_err();
	assert!(matches!(err, BlockChainError::ChainQueryError(_)));
}

#[tokio::test]
async fn test_non_hex_call_result_is_chain_query_error() {
	let client = client_with("eth_call", |_| {
		Ok(json!({"jsonrpc": "2.0", "id": 1, "result": "not hex"}))
	});

	let err = client
		.call(Address::ZERO, Bytes::new())
		.await
		.unwrap_err();
	assert!(matches!(err, BlockChainError::ChainQueryError(_)));
}

#[tokio::test]
async fn test_transport_failure_is_chain_query_error() {
	let client = client_with("eth_getLogs", |_| {
		Err(TransportError::network("connection reset", None, None))
	});

	let err = client.get_logs(&LogFilter::default()).await.unwrap_err();
	assert!(matches!(err, BlockChainError::ChainQueryError(_)));
}

#[tokio::test]
async fn test_get_logs_encodes_block_range() {
	let client = client_with("eth_getLogs", |params| {
		let params = params.unwrap();
		assert_eq!(params[0]["fromBlock"], "0x64");
		assert_eq!(params[0]["toBlock"], "0xc8");
		Ok(json!({"jsonrpc": "2.0", "id": 1, "result": []}))
	});

	let logs = client
		.get_logs(&LogFilter {
			from_block: 100,
			to_block: 200,
			..Default::default()
		})
		.await
		.unwrap();
	assert!(logs.is_empty());
}
