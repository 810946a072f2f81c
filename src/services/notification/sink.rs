//! Output sinks.
//!
//! Event lines and progress lines are written to stdout, never through the log
//! subscriber, so they stay machine-separable from diagnostics on stderr.

use serde::{Serialize, Serializer};
use std::{
	io::{self, Write},
	sync::Mutex,
};

use crate::{
	models::EventNotification,
	services::notification::formatter::{display_address, event_arguments, format_notification},
};

/// Destination of notifications and progress messages
pub trait OutputSink: Send + Sync {
	/// Writes one decoded event
	fn notify(&self, notification: &EventNotification) -> io::Result<()>;

	/// Writes one setup progress message such as `Connected to <name>`
	fn progress(&self, message: &str) -> io::Result<()>;
}

/// Rendered text lines on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
	fn notify(&self, notification: &EventNotification) -> io::Result<()> {
		writeln!(io::stdout().lock(), "{}", format_notification(notification))
	}

	fn progress(&self, message: &str) -> io::Result<()> {
		writeln!(io::stdout().lock(), "{}", message)
	}
}

#[derive(Serialize)]
struct EventRecord<'a> {
	endpoint: &'a str,
	symbol: &'a str,
	contract: String,
	kind: &'a str,
	event: &'a str,
	#[serde(serialize_with = "in_declaration_order")]
	args: Vec<(&'static str, String)>,
	block_number: Option<u64>,
	transaction_hash: Option<String>,
	message: String,
}

/// Writes event arguments as a JSON object keyed in declaration order
fn in_declaration_order<S: Serializer>(
	args: &[(&'static str, String)],
	serializer: S,
) -> Result<S::Ok, S::Error> {
	serializer.collect_map(args.iter().map(|(name, value)| (name, value)))
}

#[derive(Serialize)]
struct ProgressRecord<'a> {
	progress: &'a str,
}

/// One JSON object per line
pub struct JsonSink<W: Write + Send = io::Stdout> {
	writer: Mutex<W>,
}

impl JsonSink<io::Stdout> {
	pub fn stdout() -> Self {
		Self::new(io::stdout())
	}
}

impl<W: Write + Send> JsonSink<W> {
	pub fn new(writer: W) -> Self {
		Self {
			writer: Mutex::new(writer),
		}
	}

	pub fn into_inner(self) -> W {
		self.writer
			.into_inner()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn write_record<T: Serialize>(&self, record: &T) -> io::Result<()> {
		let line = serde_json::to_string(record).map_err(io::Error::other)?;
		let mut writer = self
			.writer
			.lock()
			.map_err(|_| io::Error::other("output writer poisoned"))?;
		writeln!(writer, "{}", line)?;
		writer.flush()
	}
}

impl<W: Write + Send> OutputSink for JsonSink<W> {
	fn notify(&self, notification: &EventNotification) -> io::Result<()> {
		let event = notification.event.kind();
		self.write_record(&EventRecord {
			endpoint: &notification.binding.endpoint_slug,
			symbol: &notification.binding.symbol,
			contract: display_address(&notification.binding.address),
			kind: notification.binding.kind.as_str(),
			event: event.name(),
			args: event_arguments(&notification.event),
			block_number: notification.block_number,
			transaction_hash: notification.transaction_hash.map(|h| h.to_string()),
			message: format_notification(notification),
		})
	}

	fn progress(&self, message: &str) -> io::Result<()> {
		self.write_record(&ProgressRecord { progress: message })
	}
}

/// Keeps rendered lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
	lines: Mutex<Vec<String>>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	/// Lines written so far, in write order
	pub fn lines(&self) -> Vec<String> {
		self.lines
			.lock()
			.map(|lines| lines.clone())
			.unwrap_or_default()
	}

	fn push(&self, line: String) -> io::Result<()> {
		self.lines
			.lock()
			.map_err(|_| io::Error::other("memory sink poisoned"))?
			.push(line);
		Ok(())
	}
}

impl OutputSink for MemorySink {
	fn notify(&self, notification: &EventNotification) -> io::Result<()> {
		self.push(format_notification(notification))
	}

	fn progress(&self, message: &str) -> io::Result<()> {
		self.push(message.to_string())
	}
}
