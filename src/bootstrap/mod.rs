//! Bootstrap module for loading configuration and starting the endpoint watchers.
//!
//! Endpoints are set up one after another in configuration order. A failing endpoint is
//! reported and skipped; the others keep running.

use std::{error::Error, future::Future, path::Path, sync::Arc};
use tokio::sync::watch;

use crate::{
	models::Endpoint,
	repositories::{EndpointRepositoryTrait, RepositoryError},
	services::{
		notification::OutputSink,
		watcher::{EvmEndpointWatcher, WatcherError},
	},
	utils::metrics::ENDPOINT_SETUP_FAILURES,
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Loads the endpoints to watch.
///
/// # Arguments
/// * `config_dir` - Directory of endpoint files, the built-in endpoints when `None`
/// * `selected` - Slugs to keep, every endpoint when empty
///
/// # Errors
/// Any configuration problem; nothing is started then.
pub async fn load_endpoints<R: EndpointRepositoryTrait>(
	config_dir: Option<&Path>,
	selected: &[String],
) -> std::result::Result<Vec<Endpoint>, RepositoryError> {
	let repository = R::new(config_dir).await?;
	let endpoints = repository.select(selected)?;
	if endpoints.is_empty() {
		return Err(RepositoryError::load_error(
			"No endpoint to watch",
			None,
			None,
		));
	}
	Ok(endpoints)
}

/// Runs `setup` for every endpoint in order and keeps the watchers that started.
///
/// A failed setup is logged with the endpoint slug and does not stop the others.
pub async fn setup_endpoints<W, F, Fut>(endpoints: &[Endpoint], setup: F) -> Vec<W>
where
	F: Fn(Endpoint) -> Fut,
	Fut: Future<Output = std::result::Result<W, WatcherError>>,
{
	let mut watchers = Vec::with_capacity(endpoints.len());
	for endpoint in endpoints {
		match setup(endpoint.clone()).await {
			Ok(watcher) => watchers.push(watcher),
			Err(e) => {
				ENDPOINT_SETUP_FAILURES
					.with_label_values(&[&endpoint.slug])
					.inc();
				tracing::error!(
					endpoint = %endpoint.slug,
					error = %e,
					"Failed to set up endpoint, continuing with the others"
				);
			}
		}
	}
	watchers
}

/// Connects and watches every endpoint over JSON-RPC.
pub async fn start_watchers(
	endpoints: &[Endpoint],
	sink: Arc<dyn OutputSink>,
	shutdown: watch::Receiver<bool>,
) -> Vec<EvmEndpointWatcher> {
	setup_endpoints(endpoints, |endpoint| {
		let sink = sink.clone();
		let shutdown = shutdown.clone();
		async move { EvmEndpointWatcher::setup(&endpoint, sink, shutdown).await }
	})
	.await
}

/// Stops every watcher, reporting failures.
pub async fn stop_watchers(watchers: &mut [EvmEndpointWatcher]) {
	for watcher in watchers.iter_mut() {
		if let Err(e) = watcher.stop().await {
			tracing::error!(endpoint = %watcher.endpoint().slug, error = %e, "Error during shutdown");
		}
	}
}
