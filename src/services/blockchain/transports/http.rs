//! HTTP JSON-RPC transport.
//!
//! The client connects to the highest weighted URL that answers the connection probe and
//! keeps the remaining URLs as fallbacks for the [`EndpointManager`].

use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, time::Duration};
use url::Url;

use crate::{
	models::Endpoint,
	services::blockchain::transports::{
		connection_probe, BlockchainTransport, EndpointManager, RotatingTransport,
		TransientErrorRetryStrategy, TransportError,
	},
	utils::http::{create_retryable_http_client, RetryConfig},
};

/// JSON-RPC over HTTP with URL failover. Cheap to clone, clones share the active URL.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	pub client: ClientWithMiddleware,
	endpoint_manager: EndpointManager,
	/// Request used to check a URL before switching to it
	probe: Value,
}

impl HttpTransportClient {
	/// Connects to the first URL of `endpoint` (by descending weight) that answers `probe`.
	///
	/// # Arguments
	/// * `endpoint` - Endpoint whose RPC URLs are tried
	/// * `probe` - JSON-RPC request used as connection check, `net_version` when `None`
	///
	/// # Returns
	/// * `Result<Self, TransportError>` - Connected client, or a network error when no URL answers
	pub async fn new(endpoint: &Endpoint, probe: Option<Value>) -> Result<Self, TransportError> {
		let probe = probe.unwrap_or_else(connection_probe);
		let metadata = Some(HashMap::from([(
			"endpoint".to_string(),
			endpoint.slug.clone(),
		)]));

		let urls: Vec<String> = endpoint
			.weighted_rpc_urls()
			.into_iter()
			.filter_map(|rpc_url| match rpc_url.url.resolve() {
				Ok(url) => Some(url.as_str().to_string()),
				Err(e) => {
					tracing::warn!(endpoint = %endpoint.slug, error = %e, "Skipping unresolved RPC URL");
					None
				}
			})
			.collect();

		let base_client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.timeout(Duration::from_secs(30))
			.connect_timeout(Duration::from_secs(20))
			.build()
			.map_err(|e| {
				TransportError::network(
					"Failed to create base HTTP client",
					Some(Box::new(e)),
					metadata.clone(),
				)
			})?;

		let client = create_retryable_http_client(
			&RetryConfig::default(),
			base_client,
			Some(TransientErrorRetryStrategy),
		);

		for url in urls.iter() {
			if let Err(e) = Self::probe_url(&client, url, &probe).await {
				tracing::debug!(endpoint = %endpoint.slug, error = %e, "RPC URL rejected");
				continue;
			}

			let fallback_urls = urls.iter().filter(|u| *u != url).cloned().collect();
			return Ok(Self {
				client: client.clone(),
				endpoint_manager: EndpointManager::new(client, url, fallback_urls),
				probe,
			});
		}

		Err(TransportError::network(
			"All RPC URLs failed to connect",
			None,
			metadata,
		))
	}

	async fn probe_url(
		client: &ClientWithMiddleware,
		url: &str,
		probe: &Value,
	) -> Result<(), anyhow::Error> {
		let url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
		let response = client
			.post(url.clone())
			.json(probe)
			.send()
			.await
			.with_context(|| format!("Failed to connect to {}", url))?;

		if !response.status().is_success() {
			anyhow::bail!(
				"Failed to connect to {}: {}",
				url,
				response.status().as_u16()
			);
		}
		Ok(())
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	async fn get_current_url(&self) -> String {
		self.endpoint_manager.active_url.read().await.clone()
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		self.endpoint_manager
			.send_raw_request(self, method, params)
			.await
	}
}

#[async_trait]
impl RotatingTransport for HttpTransportClient {
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		Self::probe_url(&self.client, url, &self.probe).await
	}

	/// The HTTP client is URL agnostic, switching only requires a valid URL
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
		tracing::info!(%url, "Switched active RPC URL");
		Ok(())
	}
}
