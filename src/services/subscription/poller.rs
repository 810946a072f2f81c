//! Log poller.
//!
//! One poller per endpoint runs on the endpoint's cron schedule. It keeps the number of
//! the last processed block, starting at the chain head so nothing historical is
//! replayed, and delivers the logs of every newer block range to the binding channels.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{watch, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
	models::{Endpoint, EvmLog},
	services::{
		blockchain::{ChainClient, LogFilter},
		subscription::{
			error::SubscriptionError,
			manager::{Route, Subscriptions},
		},
	},
	utils::metrics::{EVENTS_DECODE_FAILURES, EVENTS_RECEIVED, POLL_ERRORS},
};

/// Abstraction over the cron scheduler so tests can substitute it
#[async_trait::async_trait]
pub trait JobSchedulerTrait: Send + Sync + Sized {
	async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>>;
	async fn add(&self, job: Job) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
	async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
	async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait::async_trait]
impl JobSchedulerTrait for JobScheduler {
	async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
		Self::new().await.map_err(Into::into)
	}

	async fn add(&self, job: Job) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		self.add(job).await.map(|_| ()).map_err(Into::into)
	}

	async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		self.start().await.map(|_| ()).map_err(Into::into)
	}

	async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		self.shutdown().await.map(|_| ()).map_err(Into::into)
	}
}

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
	/// First successful head read; the cursor now points at `head`
	Initialized { head: u64 },
	/// A previous poll is still running
	Skipped,
	/// No block after the cursor
	UpToDate,
	/// Blocks `from..=to` were processed
	Processed { from: u64, to: u64, delivered: usize },
}

struct PollState<C: ChainClient> {
	endpoint_slug: String,
	max_block_range: u64,
	client: Arc<C>,
	subscriptions: Subscriptions,
	/// Last processed block, `None` until the head was read once
	cursor: Mutex<Option<u64>>,
	shutdown: watch::Receiver<bool>,
}

impl<C: ChainClient> PollState<C> {
	fn metadata(&self) -> HashMap<String, String> {
		HashMap::from([("endpoint".to_string(), self.endpoint_slug.clone())])
	}

	async fn poll(&self) -> Result<PollOutcome, SubscriptionError> {
		let Ok(mut cursor) = self.cursor.try_lock() else {
			return Ok(PollOutcome::Skipped);
		};

		let head = self.client.get_latest_block_number().await.map_err(|e| {
			SubscriptionError::poll_error(
				"Failed to read the latest block",
				Some(Box::new(e)),
				Some(self.metadata()),
			)
		})?;

		let last = match *cursor {
			Some(last) => last,
			None => {
				*cursor = Some(head);
				return Ok(PollOutcome::Initialized { head });
			}
		};
		if head <= last {
			return Ok(PollOutcome::UpToDate);
		}

		let (addresses, topics) = self.subscriptions.filter().await;
		let from = last + 1;
		if addresses.is_empty() {
			*cursor = Some(head);
			return Ok(PollOutcome::Processed {
				from,
				to: head,
				delivered: 0,
			});
		}

		let mut delivered = 0;
		let mut chunk_start = from;
		while chunk_start <= head {
			let chunk_end = head.min(chunk_start.saturating_add(self.max_block_range - 1));
			let filter = LogFilter {
				from_block: chunk_start,
				to_block: chunk_end,
				addresses: addresses.clone(),
				topics: topics.clone(),
			};
			let logs = self.client.get_logs(&filter).await.map_err(|e| {
				let mut metadata = self.metadata();
				metadata.insert("from_block".to_string(), chunk_start.to_string());
				metadata.insert("to_block".to_string(), chunk_end.to_string());
				SubscriptionError::poll_error("Failed to fetch logs", Some(Box::new(e)), Some(metadata))
			})?;

			delivered += self.dispatch(logs).await;
			*cursor = Some(chunk_end);
			chunk_start = chunk_end + 1;
		}

		Ok(PollOutcome::Processed {
			from,
			to: head,
			delivered,
		})
	}

	/// Sends the subscribed logs to their binding channels in node order
	async fn dispatch(&self, logs: Vec<EvmLog>) -> usize {
		let mut delivered = 0;
		for log in logs.iter().filter(|log| !log.removed) {
			match self.subscriptions.route(log).await {
				Route::Ignored => {}
				Route::Undecodable(binding, error) => {
					tracing::warn!(
						endpoint = %self.endpoint_slug,
						contract = %binding.address,
						block = ?log.block_number(),
						log_index = ?log.log_index(),
						error = %error,
						"Dropping undecodable log"
					);
					EVENTS_DECODE_FAILURES
						.with_label_values(&[&self.endpoint_slug])
						.inc();
				}
				Route::Deliver(sender, notification) => {
					let labels = [
						self.endpoint_slug.as_str(),
						notification.binding.kind.as_str(),
						notification.event.kind().name(),
					];
					EVENTS_RECEIVED.with_label_values(&labels).inc();

					if sender.send(notification).await.is_err() {
						let error = SubscriptionError::channel_closed(
							"Binding channel closed",
							None,
							Some(self.metadata()),
						);
						tracing::warn!(error = %error, "Dropping notification");
					} else {
						delivered += 1;
					}
				}
			}
		}
		delivered
	}

	async fn tick(&self) {
		if *self.shutdown.borrow() {
			return;
		}
		match self.poll().await {
			Ok(PollOutcome::Skipped) => {
				tracing::debug!(endpoint = %self.endpoint_slug, "Previous poll still running, skipping tick");
			}
			Ok(PollOutcome::Processed {
				from,
				to,
				delivered,
			}) => {
				tracing::debug!(endpoint = %self.endpoint_slug, from, to, delivered, "Processed blocks");
			}
			Ok(_) => {}
			Err(e) => {
				POLL_ERRORS.with_label_values(&[&self.endpoint_slug]).inc();
				tracing::warn!(error = %e, "Log poll failed, retrying on next tick");
			}
		}
	}
}

/// Scheduled `eth_getLogs` poller of one endpoint
pub struct LogPoller<C: ChainClient, J: JobSchedulerTrait = JobScheduler> {
	cron_schedule: String,
	state: Arc<PollState<C>>,
	scheduler: J,
}

impl<C, J> LogPoller<C, J>
where
	C: ChainClient + 'static,
	J: JobSchedulerTrait,
{
	pub async fn new(
		endpoint: &Endpoint,
		client: Arc<C>,
		subscriptions: Subscriptions,
		shutdown: watch::Receiver<bool>,
	) -> Result<Self, SubscriptionError> {
		let scheduler = J::new().await.map_err(|e| {
			SubscriptionError::poll_error(
				"Failed to create scheduler",
				Some(e),
				Some(HashMap::from([("endpoint".to_string(), endpoint.slug.clone())])),
			)
		})?;

		Ok(Self {
			cron_schedule: endpoint.cron_schedule.clone(),
			state: Arc::new(PollState {
				endpoint_slug: endpoint.slug.clone(),
				max_block_range: endpoint.max_block_range.max(1),
				client,
				subscriptions,
				cursor: Mutex::new(None),
				shutdown,
			}),
			scheduler,
		})
	}

	/// Runs one poll immediately.
	///
	/// The first successful call only records the head. Later calls process every block
	/// after the cursor; on failure the cursor stays at the last fully processed chunk.
	pub async fn poll_once(&self) -> Result<PollOutcome, SubscriptionError> {
		self.state.poll().await
	}

	/// Last processed block
	pub async fn cursor(&self) -> Option<u64> {
		*self.state.cursor.lock().await
	}

	/// Records the current head and schedules the poll job.
	pub async fn start(&mut self) -> Result<(), SubscriptionError> {
		if let Err(e) = self.state.poll().await {
			tracing::warn!(error = %e, "Could not read the chain head, starting on first tick");
		}

		let state = self.state.clone();
		let job = Job::new_async(self.cron_schedule.as_str(), move |_uuid, _lock| {
			let state = state.clone();
			Box::pin(async move { state.tick().await })
		})
		.map_err(|e| {
			SubscriptionError::poll_error(
				"Failed to create poll job",
				Some(Box::new(e)),
				Some(self.state.metadata()),
			)
		})?;

		self.scheduler.add(job).await.map_err(|e| {
			SubscriptionError::poll_error(
				"Failed to schedule poll job",
				Some(e),
				Some(self.state.metadata()),
			)
		})?;
		self.scheduler.start().await.map_err(|e| {
			SubscriptionError::poll_error(
				"Failed to start scheduler",
				Some(e),
				Some(self.state.metadata()),
			)
		})?;

		tracing::info!(endpoint = %self.state.endpoint_slug, schedule = %self.cron_schedule, "Started log poller");
		Ok(())
	}

	pub async fn stop(&mut self) -> Result<(), SubscriptionError> {
		self.scheduler.shutdown().await.map_err(|e| {
			SubscriptionError::poll_error(
				"Failed to stop scheduler",
				Some(e),
				Some(self.state.metadata()),
			)
		})?;
		// Wait for a tick that is still running
		let _cursor = self.state.cursor.lock().await;

		tracing::info!(endpoint = %self.state.endpoint_slug, "Stopped log poller");
		Ok(())
	}
}
