//! Prometheus metrics.
//!
//! - Global registry and the listener's counters and gauges
//! - [`gather_metrics`] renders the registry in the text exposition format

pub mod server;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

lazy_static! {
	/// Global Prometheus registry.
	pub static ref REGISTRY: Registry = Registry::new();

	/// Decoded events delivered to a contract binding's channel.
	pub static ref EVENTS_RECEIVED: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("events_received_total", "Decoded events by endpoint, contract kind and event"),
			&["endpoint", "kind", "event"],
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Logs matching a subscription that could not be decoded.
	pub static ref EVENTS_DECODE_FAILURES: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("events_decode_failures_total", "Undecodable logs by endpoint"),
			&["endpoint"],
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Contract bindings with at least one subscription.
	pub static ref CONTRACTS_WATCHED: IntGaugeVec = {
		let gauge = IntGaugeVec::new(
			Opts::new("contracts_watched", "Watched contracts by endpoint and contract kind"),
			&["endpoint", "kind"],
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Factory registry entries skipped after a failed read.
	pub static ref REGISTRY_ENTRIES_SKIPPED: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("registry_entries_skipped_total", "Registry entries skipped during the scan"),
			&["endpoint"],
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Endpoints whose setup failed.
	pub static ref ENDPOINT_SETUP_FAILURES: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("endpoint_setup_failures_total", "Failed endpoint setups"),
			&["endpoint"],
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Log polls that failed and will be retried on the next tick.
	pub static ref POLL_ERRORS: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("poll_errors_total", "Failed log polls by endpoint"),
			&["endpoint"],
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};
}

/// Gather all metrics and encode them in the Prometheus text format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}
