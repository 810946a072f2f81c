//! Subscription registration and delivery.
//!
//! Each contract binding owns a bounded channel. The first subscription on a binding
//! creates the channel and spawns the drain task that renders queued notifications into
//! the output sink, one at a time and in channel order.

use alloy::primitives::{Address, B256};
use std::{
	collections::{BTreeSet, HashMap},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};
use tokio::{
	sync::{mpsc, Mutex, RwLock},
	task::JoinHandle,
};

use crate::{
	models::{ContractBinding, ContractEvent, EventDecodeError, EventKind, EventNotification, EvmLog},
	services::{notification::OutputSink, subscription::error::SubscriptionError},
	utils::metrics::CONTRACTS_WATCHED,
};

/// Subscriptions of one binding
struct BindingEntry {
	binding: ContractBinding,
	events: BTreeSet<EventKind>,
	/// `None` once the manager is closed
	sender: Option<mpsc::Sender<EventNotification>>,
}

/// Where a log goes
pub(crate) enum Route {
	/// Unknown address, unsubscribed event or closed channel
	Ignored,
	/// Subscribed, but the log does not decode as the event
	Undecodable(ContractBinding, EventDecodeError),
	Deliver(mpsc::Sender<EventNotification>, EventNotification),
}

/// Subscription table shared between the manager and the log poller
#[derive(Clone, Default)]
pub struct Subscriptions {
	inner: Arc<RwLock<HashMap<Address, BindingEntry>>>,
}

impl Subscriptions {
	/// Bound addresses and the union of their subscribed topics, sorted
	pub async fn filter(&self) -> (Vec<Address>, Vec<B256>) {
		let table = self.inner.read().await;
		let mut addresses: Vec<Address> = table
			.iter()
			.filter(|(_, entry)| !entry.events.is_empty())
			.map(|(address, _)| *address)
			.collect();
		addresses.sort();

		let topics: BTreeSet<B256> = table
			.values()
			.flat_map(|entry| entry.events.iter().map(EventKind::topic))
			.collect();
		(addresses, topics.into_iter().collect())
	}

	/// Events subscribed on the binding at `address`
	pub async fn events_of(&self, address: &Address) -> Vec<EventKind> {
		self.inner
			.read()
			.await
			.get(address)
			.map(|entry| entry.events.iter().copied().collect())
			.unwrap_or_default()
	}

	/// Every binding with at least one subscription
	pub async fn bindings(&self) -> Vec<ContractBinding> {
		let mut bindings: Vec<_> = self
			.inner
			.read()
			.await
			.values()
			.map(|entry| entry.binding.clone())
			.collect();
		bindings.sort_by(|a, b| a.address.cmp(&b.address));
		bindings
	}

	pub(crate) async fn route(&self, log: &EvmLog) -> Route {
		let table = self.inner.read().await;
		let Some(entry) = table.get(&log.address) else {
			return Route::Ignored;
		};
		let Some(sender) = entry.sender.clone() else {
			return Route::Ignored;
		};
		let subscribed = log
			.topic0()
			.and_then(|topic| EventKind::from_topic(entry.binding.kind, topic))
			.is_some_and(|event| entry.events.contains(&event));
		if !subscribed {
			return Route::Ignored;
		}

		match ContractEvent::decode_log(entry.binding.kind, log) {
			Ok(event) => Route::Deliver(
				sender,
				EventNotification {
					binding: entry.binding.clone(),
					event,
					block_number: log.block_number(),
					transaction_hash: log.transaction_hash,
				},
			),
			Err(e) => Route::Undecodable(entry.binding.clone(), e),
		}
	}
}

/// Registers subscriptions for the bindings of one endpoint
pub struct SubscriptionManager {
	endpoint_slug: String,
	channel_capacity: usize,
	subscriptions: Subscriptions,
	sink: Arc<dyn OutputSink>,
	workers: Mutex<Vec<JoinHandle<()>>>,
	/// Set under the table write lock by `close`
	closed: AtomicBool,
}

impl SubscriptionManager {
	pub fn new(endpoint_slug: &str, channel_capacity: usize, sink: Arc<dyn OutputSink>) -> Self {
		Self {
			endpoint_slug: endpoint_slug.to_string(),
			channel_capacity,
			subscriptions: Subscriptions::default(),
			sink,
			workers: Mutex::new(Vec::new()),
			closed: AtomicBool::new(false),
		}
	}

	/// Handle on the subscription table for the log poller
	pub fn subscriptions(&self) -> Subscriptions {
		self.subscriptions.clone()
	}

	fn metadata(&self, binding: &ContractBinding, event: EventKind) -> HashMap<String, String> {
		HashMap::from([
			("endpoint".to_string(), self.endpoint_slug.clone()),
			("contract".to_string(), binding.address.to_checksum(None)),
			("event".to_string(), event.to_string()),
		])
	}

	/// Registers exactly one subscription for `event` on `binding`.
	///
	/// # Errors
	/// * `WrongContractKind` - `event` is not in the catalogue of the binding's kind, or
	///   the address is already bound with another kind
	/// * `AlreadySubscribed` - the pair is already registered
	/// * `ChannelClosed` - the manager was closed
	pub async fn subscribe(
		&self,
		binding: &ContractBinding,
		event: EventKind,
	) -> Result<(), SubscriptionError> {
		if event.contract_kind() != binding.kind {
			return Err(SubscriptionError::wrong_contract_kind(
				format!("{} is not a {} event", event, binding.kind),
				None,
				Some(self.metadata(binding, event)),
			));
		}

		let mut table = self.subscriptions.inner.write().await;
		if self.closed.load(Ordering::Acquire) {
			return Err(SubscriptionError::channel_closed(
				"subscriptions are closed",
				None,
				Some(self.metadata(binding, event)),
			));
		}
		if let Some(entry) = table.get_mut(&binding.address) {
			if entry.binding.kind != binding.kind {
				return Err(SubscriptionError::wrong_contract_kind(
					format!("contract is already bound as {}", entry.binding.kind),
					None,
					Some(self.metadata(binding, event)),
				));
			}
			if !entry.events.insert(event) {
				return Err(SubscriptionError::already_subscribed(
					format!("{} is already subscribed", event),
					None,
					Some(self.metadata(binding, event)),
				));
			}
			return Ok(());
		}

		let (sender, receiver) = mpsc::channel(self.channel_capacity);
		let worker = tokio::spawn(drain(receiver, self.sink.clone()));
		self.workers.lock().await.push(worker);

		table.insert(
			binding.address,
			BindingEntry {
				binding: binding.clone(),
				events: BTreeSet::from([event]),
				sender: Some(sender),
			},
		);
		CONTRACTS_WATCHED
			.with_label_values(&[&self.endpoint_slug, binding.kind.as_str()])
			.inc();

		tracing::debug!(endpoint = %self.endpoint_slug, contract = %binding.address, "Opened binding channel");
		Ok(())
	}

	/// Subscribes every event of the binding's catalogue.
	///
	/// Failed registrations are logged and skipped; the outcome of each event is
	/// returned in catalogue order.
	pub async fn subscribe_catalogue(
		&self,
		binding: &ContractBinding,
	) -> Vec<(EventKind, Result<(), SubscriptionError>)> {
		let mut outcomes = Vec::new();
		for event in EventKind::catalogue(binding.kind) {
			let outcome = self.subscribe(binding, *event).await;
			if let Err(e) = &outcome {
				tracing::warn!(error = %e, "Skipping subscription");
			}
			outcomes.push((*event, outcome));
		}
		outcomes
	}

	/// Closes every channel and waits for the drain tasks to deliver what is queued
	pub async fn close(&self) {
		{
			let mut table = self.subscriptions.inner.write().await;
			self.closed.store(true, Ordering::Release);
			for entry in table.values_mut() {
				if entry.sender.take().is_some() {
					CONTRACTS_WATCHED
						.with_label_values(&[&self.endpoint_slug, entry.binding.kind.as_str()])
						.dec();
				}
			}
		}

		let workers = std::mem::take(&mut *self.workers.lock().await);
		for worker in workers {
			if let Err(e) = worker.await {
				tracing::warn!(endpoint = %self.endpoint_slug, error = %e, "Drain task failed");
			}
		}
	}
}

/// Renders the notifications of one binding until its channel closes
async fn drain(mut receiver: mpsc::Receiver<EventNotification>, sink: Arc<dyn OutputSink>) {
	while let Some(notification) = receiver.recv().await {
		if let Err(e) = sink.notify(&notification) {
			tracing::warn!(
				endpoint = %notification.binding.endpoint_slug,
				event = %notification.event.kind(),
				error = %e,
				"Failed to write notification"
			);
		}
	}
}
