//! Subscription error types.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Failures registering or delivering a subscription
#[derive(ThisError, Debug)]
pub enum SubscriptionError {
	/// The event is not part of the binding's contract kind
	#[error("Wrong contract kind: {0}")]
	WrongContractKind(ErrorContext),

	/// The (binding, event) pair is already registered
	#[error("Already subscribed: {0}")]
	AlreadySubscribed(ErrorContext),

	/// The binding's channel no longer accepts notifications
	#[error("Channel closed: {0}")]
	ChannelClosed(ErrorContext),

	/// Fetching logs or scheduling the poller failed
	#[error("Poll error: {0}")]
	PollError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl SubscriptionError {
	pub fn wrong_contract_kind(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::WrongContractKind(ErrorContext::new(msg, source, metadata))
	}

	pub fn already_subscribed(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::AlreadySubscribed(ErrorContext::new(msg, source, metadata))
	}

	pub fn channel_closed(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ChannelClosed(ErrorContext::new(msg, source, metadata))
	}

	pub fn poll_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::PollError(ErrorContext::new(msg, source, metadata))
	}
}

impl TraceableError for SubscriptionError {
	fn trace_id(&self) -> String {
		match self {
			Self::WrongContractKind(ctx)
			| Self::AlreadySubscribed(ctx)
			| Self::ChannelClosed(ctx)
			| Self::PollError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
