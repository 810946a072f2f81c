//! Endpoint watcher.
//!
//! Sets up everything one endpoint needs, in order: connection, marketplace and factory
//! subscriptions, the registry scan with one token binding per discovered contract, and
//! finally the log poller. Progress lines go to the output sink.

use futures::{pin_mut, StreamExt};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::watch;
use tokio_cron_scheduler::JobScheduler;

use crate::{
	models::{ContractBinding, ContractKind, Endpoint},
	services::{
		blockchain::{ChainClient, EvmClient, HttpTransportClient},
		connector::{ChainConnector, EvmConnector},
		notification::{display_address, OutputSink},
		registry::{RegistryEntry, RegistryScanner},
		subscription::{JobSchedulerTrait, LogPoller, SubscriptionManager, Subscriptions},
		watcher::error::WatcherError,
	},
};

/// Watcher used outside of tests
pub type EvmEndpointWatcher = EndpointWatcher<EvmClient<HttpTransportClient>, JobScheduler>;

/// Running subscriptions of one endpoint
pub struct EndpointWatcher<C: ChainClient, J: JobSchedulerTrait = JobScheduler> {
	endpoint: Endpoint,
	manager: SubscriptionManager,
	poller: LogPoller<C, J>,
}

impl EvmEndpointWatcher {
	/// Connects to `endpoint` and sets up all of its subscriptions.
	pub async fn setup(
		endpoint: &Endpoint,
		sink: Arc<dyn OutputSink>,
		shutdown: watch::Receiver<bool>,
	) -> Result<Self, WatcherError> {
		let connector = EvmConnector::connect(endpoint).await.map_err(|e| {
			WatcherError::connection_error(
				format!("Failed to connect to {}", endpoint.name),
				Some(Box::new(e)),
				Some(HashMap::from([("endpoint".to_string(), endpoint.slug.clone())])),
			)
		})?;
		Self::setup_with_connector(connector, sink, shutdown).await
	}
}

impl<C, J> EndpointWatcher<C, J>
where
	C: ChainClient + 'static,
	J: JobSchedulerTrait,
{
	/// Sets up subscriptions on an already connected endpoint.
	///
	/// Failed subscriptions and registry entries are logged and skipped. Only a poller
	/// that cannot be scheduled fails the setup.
	pub async fn setup_with_connector(
		connector: ChainConnector<C>,
		sink: Arc<dyn OutputSink>,
		shutdown: watch::Receiver<bool>,
	) -> Result<Self, WatcherError> {
		let endpoint = connector.endpoint().clone();
		progress(sink.as_ref(), &format!("Connected to {}", endpoint.name));

		let manager = SubscriptionManager::new(&endpoint.slug, endpoint.channel_capacity, sink.clone());
		manager.subscribe_catalogue(&connector.marketplace()).await;

		let factory = connector.factory();
		manager.subscribe_catalogue(&factory).await;

		scan_registry(&connector, &manager, factory, sink.as_ref()).await;

		let mut poller = LogPoller::<C, J>::new(
			&endpoint,
			connector.client(),
			manager.subscriptions(),
			shutdown,
		)
		.await
		.map_err(|e| scheduler_error("Failed to create log poller", &endpoint, e))?;
		if let Err(e) = poller.start().await {
			manager.close().await;
			return Err(scheduler_error("Failed to start log poller", &endpoint, e));
		}

		tracing::info!(endpoint = %endpoint.slug, "Watching endpoint");
		Ok(Self {
			endpoint,
			manager,
			poller,
		})
	}

	pub fn endpoint(&self) -> &Endpoint {
		&self.endpoint
	}

	/// Subscription table of this endpoint
	pub fn subscriptions(&self) -> Subscriptions {
		self.manager.subscriptions()
	}

	pub fn poller(&self) -> &LogPoller<C, J> {
		&self.poller
	}

	/// Stops polling, then lets every binding deliver what is already queued.
	pub async fn stop(&mut self) -> Result<(), WatcherError> {
		let stopped = self
			.poller
			.stop()
			.await
			.map_err(|e| scheduler_error("Failed to stop log poller", &self.endpoint, e));
		self.manager.close().await;
		stopped
	}
}

/// Binds and subscribes every contract of the factory registry
async fn scan_registry<C: ChainClient>(
	connector: &ChainConnector<C>,
	manager: &SubscriptionManager,
	factory: ContractBinding,
	sink: &dyn OutputSink,
) {
	let scan = match RegistryScanner::new(connector, factory).start().await {
		Ok(scan) => scan,
		Err(e) => {
			tracing::warn!(endpoint = %connector.endpoint().slug, error = %e, "Skipping registry scan");
			return;
		}
	};
	progress(
		sink,
		&format!(
			"{} addresses have deployed tokens in this factory",
			scan.creators_count
		),
	);

	let entries = scan.entries();
	pin_mut!(entries);
	while let Some(entry) = entries.next().await {
		match entry {
			RegistryEntry::Creator {
				creator,
				contract_count,
				..
			} => progress(
				sink,
				&format!(
					"{} has deployed {} contracts",
					display_address(&creator),
					contract_count
				),
			),
			RegistryEntry::Contract(contract) => {
				let token = connector.bind(contract.address, ContractKind::Token);
				manager.subscribe_catalogue(&token).await;

				let name = match connector.token_name(&token).await {
					Ok(name) => name,
					Err(e) => {
						tracing::warn!(contract = %token.address, error = %e, "Could not read token name");
						"unknown".to_string()
					}
				};
				progress(
					sink,
					&format!(
						"Set up listeners for {} or {}",
						display_address(&token.address),
						name
					),
				);
			}
		}
	}
}

fn progress(sink: &dyn OutputSink, message: &str) {
	if let Err(e) = sink.progress(message) {
		tracing::warn!(error = %e, "Failed to write progress message");
	}
}

fn scheduler_error(
	msg: &str,
	endpoint: &Endpoint,
	source: crate::services::subscription::SubscriptionError,
) -> WatcherError {
	WatcherError::scheduler_error(
		msg,
		Some(Box::new(source)),
		Some(HashMap::from([("endpoint".to_string(), endpoint.slug.clone())])),
	)
}
