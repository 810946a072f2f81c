//! EVM JSON-RPC client.
//!
//! Turns [`ChainClient`] operations into `eth_chainId`, `eth_blockNumber`, `eth_call`
//! and `eth_getLogs` requests over any [`BlockchainTransport`].

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::instrument;

use crate::{
	models::{Endpoint, EvmLog},
	services::blockchain::{
		client::{ChainClient, LogFilter},
		transports::{BlockchainTransport, HttpTransportClient},
		BlockChainError,
	},
	utils::{decode_hex_data, parse_hex_quantity},
};

/// Client for EVM compatible nodes
#[derive(Clone)]
pub struct EvmClient<T: Send + Sync + Clone> {
	transport: T,
	/// Endpoint slug, attached to every error
	slug: String,
}

impl<T: Send + Sync + Clone> EvmClient<T> {
	pub fn new_with_transport(transport: T, endpoint: &Endpoint) -> Self {
		Self {
			transport,
			slug: endpoint.slug.clone(),
		}
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	fn metadata(&self, method: &str) -> Option<HashMap<String, String>> {
		Some(HashMap::from([
			("endpoint".to_string(), self.slug.clone()),
			("method".to_string(), method.to_string()),
		]))
	}
}

impl EvmClient<HttpTransportClient> {
	/// Connects to the endpoint's RPC URLs.
	///
	/// # Returns
	/// * `Result<Self, BlockChainError>` - Client, or `ConnectivityError` when no URL answers
	pub async fn new(endpoint: &Endpoint) -> Result<Self, BlockChainError> {
		let transport = HttpTransportClient::new(endpoint, None)
			.await
			.map_err(|e| {
				BlockChainError::connectivity_error(
					format!("Failed to connect to {}", endpoint.name),
					Some(Box::new(e)),
					Some(HashMap::from([(
						"endpoint".to_string(),
						endpoint.slug.clone(),
					)])),
				)
			})?;
		Ok(Self::new_with_transport(transport, endpoint))
	}
}

impl<T: Send + Sync + Clone + BlockchainTransport> EvmClient<T> {
	/// Sends a request and extracts its `result`.
	///
	/// Transport failures and JSON-RPC `error` objects are chain query errors; the
	/// caller decides whether the failure is fatal.
	async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, BlockChainError> {
		let response = self
			.transport
			.send_raw_request(method, params)
			.await
			.map_err(|e| {
				BlockChainError::chain_query_error(
					format!("{} request failed", method),
					Some(Box::new(e)),
					self.metadata(method),
				)
			})?;

		if let Some(error) = response.get("error") {
			return Err(BlockChainError::chain_query_error(
				format!("{} returned an error: {}", method, error),
				None,
				self.metadata(method),
			));
		}

		match response.get("result") {
			Some(result) if !result.is_null() => Ok(result.clone()),
			_ => Err(BlockChainError::chain_query_error(
				format!("{} response is missing 'result'", method),
				None,
				self.metadata(method),
			)),
		}
	}

	async fn request_quantity(&self, method: &str) -> Result<u64, BlockChainError> {
		let result = self.request(method, None).await?;
		result
			.as_str()
			.ok_or_else(|| "result is not a string".to_string())
			.and_then(parse_hex_quantity)
			.map_err(|e| {
				BlockChainError::chain_query_error(
					format!("{} returned an invalid quantity: {}", method, e),
					None,
					self.metadata(method),
				)
			})
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> ChainClient for EvmClient<T> {
	#[instrument(skip(self), fields(endpoint = %self.slug))]
	async fn get_chain_id(&self) -> Result<u64, BlockChainError> {
		self.request_quantity("eth_chainId").await
	}

	#[instrument(skip(self), fields(endpoint = %self.slug))]
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError> {
		self.request_quantity("eth_blockNumber").await
	}

	#[instrument(skip(self, data), fields(endpoint = %self.slug))]
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, BlockChainError> {
		let params = json!([{ "to": to, "data": data }, "latest"]);
		let result = self.request("eth_call", Some(params)).await?;

		result
			.as_str()
			.ok_or_else(|| "result is not a string".to_string())
			.and_then(decode_hex_data)
			.map(Bytes::from)
			.map_err(|e| {
				BlockChainError::chain_query_error(
					format!("eth_call returned invalid data: {}", e),
					None,
					self.metadata("eth_call")
						.map(|mut m| {
							m.insert("contract".to_string(), to.to_checksum(None));
							m
						}),
				)
			})
	}

	#[instrument(skip(self, filter), fields(endpoint = %self.slug, from = filter.from_block, to = filter.to_block))]
	async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<EvmLog>, BlockChainError> {
		let params = json!([{
			"fromBlock": format!("0x{:x}", filter.from_block),
			"toBlock": format!("0x{:x}", filter.to_block),
			"address": filter.addresses,
			"topics": [filter.topics],
		}]);
		let result = self.request("eth_getLogs", Some(params)).await?;

		serde_json::from_value(result).map_err(|e| {
			BlockChainError::chain_query_error(
				"Failed to parse eth_getLogs response",
				Some(Box::new(e)),
				self.metadata("eth_getLogs"),
			)
		})
	}
}
