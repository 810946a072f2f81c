//! Endpoint watcher error types.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Failures setting up or running the watcher of one endpoint
#[derive(ThisError, Debug)]
pub enum WatcherError {
	/// The endpoint could not be connected or rejected the handshake
	#[error("Connection error: {0}")]
	ConnectionError(ErrorContext),

	/// The log poller could not be created, started or stopped
	#[error("Scheduler error: {0}")]
	SchedulerError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl WatcherError {
	pub fn connection_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConnectionError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn scheduler_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SchedulerError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for WatcherError {
	fn trace_id(&self) -> String {
		match self {
			Self::ConnectionError(ctx) => ctx.trace_id.clone(),
			Self::SchedulerError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
