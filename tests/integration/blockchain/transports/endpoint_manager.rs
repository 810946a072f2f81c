use mockito::Server;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

use chain_event_listener::services::blockchain::{EndpointManager, TransportError};

use crate::integration::mocks::{AlwaysFailsToUpdateClientTransport, MockTransport};

fn get_mock_client_builder() -> ClientWithMiddleware {
	ClientBuilder::new(reqwest::Client::new()).build()
}

#[tokio::test]
async fn test_endpoint_rotation() {
	let server1 = Server::new_async().await;
	let mut server2 = Server::new_async().await;

	let mock2 = server2
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url()],
	);
	let transport = MockTransport::new();

	let new_url = manager.try_rotate_url(&transport).await.unwrap();
	assert_eq!(new_url, server2.url());
	assert_eq!(&*manager.active_url.read().await, &server2.url());
	// The demoted URL stays available as a fallback
	assert_eq!(&*manager.fallback_urls.read().await, &vec![server1.url()]);

	mock2.assert();
}

#[tokio::test]
async fn test_send_raw_request() {
	let mut server = Server::new_async().await;

	let mock = server
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(json!({
			"method": "eth_blockNumber",
			"params": []
		})))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "0x10", "id": 1}"#)
		.create_async()
		.await;

	let manager = EndpointManager::new(get_mock_client_builder(), server.url().as_ref(), vec![]);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_blockNumber", None::<serde_json::Value>)
		.await
		.unwrap();

	assert_eq!(result["result"], "0x10");
	mock.assert();
}

#[tokio::test]
async fn test_rotation_on_rate_limit() {
	let mut primary_server = Server::new_async().await;
	let mut fallback_server = Server::new_async().await;

	let primary_mock = primary_server
		.mock("POST", "/")
		.with_status(429)
		.with_body("Rate limited")
		.expect(1)
		.create_async()
		.await;

	let _probe = fallback_server
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;
	let fallback_mock = fallback_server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "success", "id": 1}"#)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		primary_server.url().as_ref(),
		vec![fallback_server.url()],
	);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_chainId", Some(json!([])))
		.await
		.unwrap();

	assert_eq!(result["result"], "success");
	primary_mock.assert();
	fallback_mock.assert();
	assert_eq!(&*manager.active_url.read().await, &fallback_server.url());
}

#[tokio::test]
async fn test_every_url_rate_limited() {
	let mut first = Server::new_async().await;
	let mut second = Server::new_async().await;

	let mut mocks = Vec::new();
	for server in [&mut first, &mut second] {
		mocks.push(server.mock("GET", "/").with_status(200).create_async().await);
		mocks.push(
			server
				.mock("POST", "/")
				.with_status(429)
				.with_body("Rate limited")
				.create_async()
				.await,
		);
	}

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		first.url().as_ref(),
		vec![second.url()],
	);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_chainId", Some(json!([])))
		.await;

	match result {
		Err(TransportError::Http { status_code, .. }) => assert_eq!(status_code.as_u16(), 429),
		other => panic!("Expected Http error, got {:?}", other.map(|_| ())),
	}
}

#[tokio::test]
async fn test_no_fallback_urls_available() {
	let mut server = Server::new_async().await;

	let mock = server
		.mock("POST", "/")
		.with_status(429)
		.with_body("Rate limited")
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(get_mock_client_builder(), server.url().as_ref(), vec![]);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_chainId", Some(json!([])))
		.await;

	assert!(matches!(result, Err(TransportError::Http { .. })));
	mock.assert();
}

#[tokio::test]
async fn test_non_rotating_status_is_returned() {
	let mut primary_server = Server::new_async().await;
	let fallback_server = Server::new_async().await;

	let mock = primary_server
		.mock("POST", "/")
		.with_status(400)
		.with_body("Bad request")
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		primary_server.url().as_ref(),
		vec![fallback_server.url()],
	);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_chainId", Some(json!([])))
		.await;

	assert!(matches!(result, Err(TransportError::Http { .. })));
	assert_eq!(&*manager.active_url.read().await, &primary_server.url());
	mock.assert();
}

#[tokio::test]
async fn test_rotation_fails_when_client_update_fails() {
	let primary_server = Server::new_async().await;
	let fallback_server = Server::new_async().await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		primary_server.url().as_ref(),
		vec![fallback_server.url()],
	);
	let transport = AlwaysFailsToUpdateClientTransport {
		current_url: Arc::new(RwLock::new(primary_server.url())),
	};

	let result = manager.try_rotate_url(&transport).await;

	assert!(matches!(result, Err(TransportError::UrlRotation(_))));
	assert_eq!(&*manager.active_url.read().await, &primary_server.url());
	assert_eq!(
		&*manager.fallback_urls.read().await,
		&vec![fallback_server.url()]
	);
}

#[tokio::test]
async fn test_network_error_rotates_to_fallback() {
	let mut fallback_server = Server::new_async().await;
	let _probe = fallback_server
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;
	let fallback_mock = fallback_server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "0x61", "id": 1}"#)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		"http://127.0.0.1:1",
		vec![fallback_server.url()],
	);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_chainId", Some(json!([])))
		.await
		.unwrap();

	assert_eq!(result["result"], "0x61");
	fallback_mock.assert();
}
