//! JSON-RPC transport for EVM nodes.
//!
//! [`HttpTransportClient`] talks to one endpoint through a prioritized list of RPC URLs.
//! Transient failures are retried by the HTTP middleware; rate limiting and network
//! failures rotate to the next URL through the [`EndpointManager`].

mod endpoint_manager;
mod error;
mod http;

pub use endpoint_manager::EndpointManager;
pub use error::TransportError;
pub use http::HttpTransportClient;

use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde::Serialize;
use serde_json::{json, Value};

/// HTTP status codes that make the endpoint manager switch to another URL
pub const ROTATE_ON_ERROR_CODES: [u16; 1] = [429];

/// Request sent to every candidate URL before it is used
pub fn connection_probe() -> Value {
	json!({
		"jsonrpc": "2.0",
		"id": 1,
		"method": "net_version",
		"params": []
	})
}

/// Raw JSON-RPC access to a node
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// URL currently receiving requests
	async fn get_current_url(&self) -> String;

	/// Sends `method` with `params` and returns the full JSON-RPC response object
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize;

	/// Builds the JSON-RPC 2.0 envelope
	async fn customize_request<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params.map(Into::into).unwrap_or_else(|| json!([]))
		})
	}
}

/// Transport able to switch between RPC URLs
#[async_trait::async_trait]
pub trait RotatingTransport: BlockchainTransport {
	/// Probes `url` without switching to it
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error>;

	/// Makes `url` the active URL
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error>;
}

/// Retry classification used by the HTTP middleware: reqwest-retry's defaults
/// (5xx, 408, 429 and connection failures are transient)
pub struct TransientErrorRetryStrategy;

impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(success) => default_on_request_success(success),
			Err(error) => default_on_request_failure(error),
		}
	}
}
