//! Active/fallback RPC URL bookkeeping.
//!
//! Requests go to the active URL. A rate-limited response or a network failure promotes
//! the first reachable fallback URL and the request is replayed there; the demoted URL
//! goes to the back of the fallback list.

use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};

use crate::services::blockchain::transports::{
	RotatingTransport, TransportError, ROTATE_ON_ERROR_CODES,
};

#[derive(Clone, Debug)]
pub struct EndpointManager {
	pub active_url: Arc<RwLock<String>>,
	pub fallback_urls: Arc<RwLock<Vec<String>>>,
	client: ClientWithMiddleware,
	rotation_lock: Arc<Mutex<()>>,
}

/// What happened to one attempt on one URL
enum Attempt {
	Response(reqwest::Response),
	Network(reqwest_middleware::Error),
}

impl EndpointManager {
	pub fn new(client: ClientWithMiddleware, active_url: &str, fallback_urls: Vec<String>) -> Self {
		Self {
			active_url: Arc::new(RwLock::new(active_url.to_string())),
			fallback_urls: Arc::new(RwLock::new(fallback_urls)),
			client,
			rotation_lock: Arc::new(Mutex::new(())),
		}
	}

	/// Promotes the first fallback URL that accepts a connection.
	///
	/// # Returns
	/// * `Result<String, TransportError>` - The new active URL, or `UrlRotation` when no
	///   fallback is left or the candidate cannot be reached
	pub async fn try_rotate_url<T: RotatingTransport>(
		&self,
		transport: &T,
	) -> Result<String, TransportError> {
		let _guard = self.rotation_lock.lock().await;
		let previous = self.active_url.read().await.clone();
		let candidate = self
			.fallback_urls
			.read()
			.await
			.iter()
			.find(|url| **url != previous)
			.cloned();

		let Some(candidate) = candidate else {
			return Err(TransportError::url_rotation(
				format!("No fallback URLs available for '{}'", previous),
				None,
				None,
			));
		};

		tracing::debug!(from = %previous, to = %candidate, "Rotating RPC URL");

		transport.try_connect(&candidate).await.map_err(|e| {
			TransportError::url_rotation(
				format!("Failed to connect to new URL '{}'", candidate),
				Some(e.into()),
				None,
			)
		})?;
		transport.update_client(&candidate).await.map_err(|e| {
			TransportError::url_rotation(
				format!("Failed to switch transport to new URL '{}'", candidate),
				Some(e.into()),
				None,
			)
		})?;

		let mut active = self.active_url.write().await;
		let mut fallbacks = self.fallback_urls.write().await;
		fallbacks.retain(|url| *url != candidate);
		fallbacks.push(previous);
		*active = candidate.clone();

		Ok(candidate)
	}

	async fn attempt<P>(
		&self,
		url: &str,
		transport: &impl RotatingTransport,
		method: &str,
		params: Option<P>,
	) -> Result<Attempt, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let body = transport.customize_request(method, params).await;
		let body = serde_json::to_string(&body).map_err(|e| {
			TransportError::request_serialization(
				"Failed to serialize request JSON",
				Some(Box::new(e)),
				None,
			)
		})?;

		let sent = self
			.client
			.post(url)
			.header("Content-Type", "application/json")
			.body(body)
			.send()
			.await;

		Ok(match sent {
			Ok(response) => Attempt::Response(response),
			Err(e) => Attempt::Network(e),
		})
	}

	/// Rotates unless every URL was already tried for the current request
	async fn rotate_within<T: RotatingTransport>(
		&self,
		transport: &T,
		rotations_left: &mut usize,
	) -> Result<String, TransportError> {
		if *rotations_left == 0 {
			return Err(TransportError::url_rotation(
				"Every RPC URL failed for this request",
				None,
				None,
			));
		}
		*rotations_left -= 1;
		self.try_rotate_url(transport).await
	}

	/// Sends a JSON-RPC request, rotating URLs on rate limiting or network failure.
	///
	/// Each URL is tried at most once per request.
	///
	/// # Arguments
	/// * `transport` - Transport used for probing candidate URLs during rotation
	/// * `method` - JSON-RPC method name
	/// * `params` - JSON-RPC parameters
	///
	/// # Returns
	/// * `Result<Value, TransportError>` - The parsed JSON response body
	pub async fn send_raw_request<T, P>(
		&self,
		transport: &T,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		T: RotatingTransport,
		P: Into<Value> + Send + Clone + Serialize,
	{
		let mut rotations_left = self.fallback_urls.read().await.len();
		loop {
			let url = self.active_url.read().await.clone();
			let metadata = Some(HashMap::from([
				("url".to_string(), url.clone()),
				("method".to_string(), method.to_string()),
			]));

			match self.attempt(&url, transport, method, params.clone()).await? {
				Attempt::Response(response) if response.status().is_success() => {
					return response.json().await.map_err(|e| {
						TransportError::response_parse(
							"Failed to parse JSON response",
							Some(Box::new(e)),
							metadata,
						)
					});
				}
				Attempt::Response(response) => {
					let status = response.status();
					let body = response.text().await.unwrap_or_default();
					tracing::warn!(%url, %status, method, "RPC request failed");

					if !ROTATE_ON_ERROR_CODES.contains(&status.as_u16()) {
						return Err(TransportError::http(status, url, body, None, metadata));
					}
					if let Err(rotation) = self.rotate_within(transport, &mut rotations_left).await {
						return Err(TransportError::http(
							status,
							url,
							body,
							Some(Box::new(rotation)),
							metadata,
						));
					}
				}
				Attempt::Network(error) => {
					tracing::warn!(%url, method, error = %error, "RPC request could not be sent");

					if let Err(rotation) = self.rotate_within(transport, &mut rotations_left).await {
						return Err(TransportError::network(
							error.to_string(),
							Some(Box::new(rotation)),
							metadata,
						));
					}
				}
			}
		}
	}
}
