//! Event formatter and output sinks.
//!
//! - `formatter`: pure rendering of decoded events into one-line messages
//! - `sink`: where rendered events and progress messages are written

mod formatter;
mod sink;

pub use formatter::{display_address, event_arguments, format_line, format_notification};
pub use sink::{JsonSink, MemorySink, OutputSink, StdoutSink};

use clap::ValueEnum;
use std::sync::Arc;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
	/// Human readable lines
	#[default]
	Text,
	/// One JSON object per line
	Json,
}

impl OutputFormat {
	/// Creates the stdout sink for this format
	pub fn sink(self) -> Arc<dyn OutputSink> {
		match self {
			Self::Text => Arc::new(StdoutSink),
			Self::Json => Arc::new(JsonSink::stdout()),
		}
	}
}
