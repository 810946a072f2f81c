//! Error context shared by every error type in the crate.
//!
//! [`ErrorContext`] carries a message, an optional source error, key/value metadata
//! (endpoint slug, contract address, event name, ...), a timestamp and a trace id.
//! Service error enums wrap it so that every failure can be reported with the
//! endpoint, contract or event it affected.

use chrono::Utc;
use std::{collections::HashMap, fmt};
use uuid::Uuid;

/// Boxed error type accepted as the source of an [`ErrorContext`]
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message, source, metadata, timestamp and trace id of a single failure.
#[derive(Debug)]
pub struct ErrorContext {
	/// Human readable description
	pub message: String,
	/// Underlying error, if any
	pub source: Option<BoxedSource>,
	/// Additional key/value context such as `endpoint` or `contract`
	pub metadata: Option<HashMap<String, String>>,
	/// RFC 3339 creation time
	pub timestamp: String,
	/// UUID v4, inherited from the source when it already carries one
	pub trace_id: String,
}

impl ErrorContext {
	/// Creates a new error context.
	///
	/// The trace id is taken from `source` when the source (or one of its own sources)
	/// is a traceable error of this crate, so that one failure keeps one id while it
	/// travels up through the layers.
	pub fn new(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let trace_id = match source.as_ref() {
			Some(src) => TraceableError::trace_id(src.as_ref()),
			None => Uuid::new_v4().to_string(),
		};

		Self {
			message: message.into(),
			source,
			metadata,
			timestamp: Utc::now().to_rfc3339(),
			trace_id,
		}
	}

	/// Creates a new error context and emits it as an `error` level event.
	pub fn new_with_log(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let context = Self::new(message, source, metadata);
		log_error(&context);
		context
	}

	/// Adds one metadata entry.
	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.metadata
			.get_or_insert_with(HashMap::new)
			.insert(key.into(), value.into());
		self
	}

	/// Renders `"message [k1=v1, k2=v2]"` with keys sorted alphabetically.
	pub fn format_with_metadata(&self) -> String {
		let Some(metadata) = self.metadata.as_ref().filter(|m| !m.is_empty()) else {
			return self.message.clone();
		};

		let mut pairs: Vec<_> = metadata.iter().collect();
		pairs.sort_by(|a, b| a.0.cmp(b.0));
		let rendered = pairs
			.into_iter()
			.map(|(key, value)| format!("{}={}", key, value))
			.collect::<Vec<_>>()
			.join(", ");

		format!("{} [{}]", self.message, rendered)
	}
}

impl fmt::Display for ErrorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.format_with_metadata())
	}
}

impl std::error::Error for ErrorContext {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.source
			.as_ref()
			.map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
	}
}

/// Errors that expose the trace id of their [`ErrorContext`]
pub trait TraceableError: std::error::Error + Send + Sync {
	fn trace_id(&self) -> String;
}

impl TraceableError for dyn std::error::Error + Send + Sync + 'static {
	fn trace_id(&self) -> String {
		const MAX_DEPTH: usize = 3;

		if let Some(id) = extract_trace_id(self) {
			return id;
		}

		let mut current = self.source();
		let mut depth = 0;
		while let Some(err) = current {
			depth += 1;
			if depth > MAX_DEPTH {
				break;
			}
			if let Some(id) = extract_trace_id(err) {
				return id;
			}
			current = err.source();
		}

		Uuid::new_v4().to_string()
	}
}

fn extract_trace_id(err: &(dyn std::error::Error + 'static)) -> Option<String> {
	if let Some(ctx) = err.downcast_ref::<ErrorContext>() {
		return Some(ctx.trace_id.clone());
	}

	macro_rules! try_downcast {
		($($ty:path),*) => {
			$(
				if let Some(e) = err.downcast_ref::<$ty>() {
					return Some(e.trace_id());
				}
			)*
		}
	}

	try_downcast!(
		crate::services::blockchain::BlockChainError,
		crate::services::blockchain::TransportError,
		crate::services::subscription::SubscriptionError,
		crate::services::watcher::WatcherError,
		crate::repositories::RepositoryError,
		crate::models::ConfigError
	);

	None
}

/// Drops HTML bodies that some RPC gateways return with 5xx responses
fn sanitize_error_message(message: &str) -> String {
	let is_html = ["<html>", "<head>", "<body>"]
		.iter()
		.any(|tag| message.contains(tag));
	match message.find('<') {
		Some(pos) if is_html => message[..pos].trim().to_string(),
		_ => message.to_string(),
	}
}

fn format_error_chain(err: &dyn std::error::Error) -> String {
	let mut chain = sanitize_error_message(&err.to_string());
	let mut current = err.source();
	while let Some(err) = current {
		chain.push_str("\n\tCaused by: ");
		chain.push_str(&sanitize_error_message(&err.to_string()));
		current = err.source();
	}
	chain
}

fn log_error(error: &ErrorContext) {
	match &error.source {
		Some(source) => tracing::error!(
			message = error.format_with_metadata(),
			trace_id = %error.trace_id,
			timestamp = %error.timestamp,
			error.chain = %format_error_chain(&**source),
			"Error occurred"
		),
		None => tracing::error!(
			message = error.format_with_metadata(),
			trace_id = %error.trace_id,
			timestamp = %error.timestamp,
			"Error occurred"
		),
	}
}
