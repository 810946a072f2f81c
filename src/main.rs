//! Chain event listener entry point.
//!
//! Loads the endpoint configuration, sets up one watcher per endpoint and prints a line
//! for every observed contract event until interrupted.
//!
//! # Flow
//! 1. Loads endpoints from the configuration directory or the built-in list
//! 2. Sets up the endpoints one after another; a failing endpoint is skipped
//! 3. Polls every endpoint for logs and prints the decoded events
//! 4. Stops the pollers and flushes queued events on Ctrl+C

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

use crate::{
	bootstrap::{load_endpoints, start_watchers, stop_watchers, Result},
	repositories::EndpointRepository,
	services::notification::OutputFormat,
	utils::{logging::setup_logging, metrics::server::create_metrics_server, parse_string_to_bytes_size},
};

use clap::Parser;
use dotenvy::dotenv_override;
use std::{
	env::{set_var, var},
	path::PathBuf,
};
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Parser)]
#[command(
	name = "chain-event-listener",
	about = "Watches marketplace, factory and token contracts on EVM networks and prints their events.",
	version
)]
struct Cli {
	/// Write logs to file instead of stderr
	#[arg(long)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Path to store log files (default: logs/)
	#[arg(long, value_name = "PATH")]
	log_path: Option<String>,

	/// Maximum log file size before rolling (e.g., "1GB", "500MB", "1024KB")
	#[arg(long, value_name = "SIZE", value_parser = parse_string_to_bytes_size)]
	log_max_size: Option<u64>,

	/// Address to start the metrics server on (default: 127.0.0.1:8081)
	#[arg(long, value_name = "HOST:PORT")]
	metrics_address: Option<String>,

	/// Enable metrics server
	#[arg(long)]
	metrics: bool,

	/// Directory of endpoint configuration files (default: built-in endpoints)
	#[arg(long, value_name = "DIR", env = "CONFIG_DIR")]
	config_dir: Option<PathBuf>,

	/// Only watch this endpoint, may be repeated
	#[arg(long = "endpoint", value_name = "SLUG")]
	endpoints: Vec<String>,

	/// Format of the event lines
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	output: OutputFormat,

	/// Validate configuration without starting the listener
	#[arg(long)]
	check: bool,
}

impl Cli {
	/// Apply CLI options to environment variables, overriding any existing values
	fn apply_to_env(&self) {
		// Set log level from RUST_LOG if it exists
		if let Ok(level) = var("RUST_LOG") {
			set_var("LOG_LEVEL", level);
		}

		if self.log_file {
			set_var("LOG_MODE", "file");
		}

		if let Some(level) = &self.log_level {
			set_var("LOG_LEVEL", level);
			set_var("RUST_LOG", level);
		}

		if let Some(path) = &self.log_path {
			set_var("LOG_DATA_DIR", path);
		}

		if let Some(max_size) = &self.log_max_size {
			set_var("LOG_MAX_SIZE", max_size.to_string());
		}

		if self.metrics {
			set_var("METRICS_ENABLED", "true");
		}

		if let Some(address) = &self.metrics_address {
			if let Some(port) = address.split(':').nth(1) {
				set_var("METRICS_PORT", port);
			}
		}
	}
}

/// Main entry point of the listener.
///
/// # Errors
/// Returns an error on invalid configuration or when no endpoint could be set up.
#[tokio::main]
async fn main() -> Result<()> {
	// Environment files override existing variables; CLI flags override both
	dotenv_override().ok();
	let cli = Cli::parse();
	cli.apply_to_env();

	setup_logging().unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let endpoints =
		load_endpoints::<EndpointRepository>(cli.config_dir.as_deref(), &cli.endpoints).await?;

	if cli.check {
		info!(endpoints = endpoints.len(), "Configuration is valid");
		return Ok(());
	}

	let metrics_enabled =
		cli.metrics || var("METRICS_ENABLED").map(|v| v == "true").unwrap_or(false);
	let metrics_address = cli
		.metrics_address
		.clone()
		.unwrap_or_else(|| "127.0.0.1:8081".to_string());

	let metrics_server = if metrics_enabled {
		match create_metrics_server(metrics_address) {
			Ok(server) => Some(server),
			Err(e) => {
				error!("Failed to create metrics server: {}", e);
				None
			}
		}
	} else {
		info!("Metrics server disabled. Use --metrics flag or METRICS_ENABLED=true to enable");
		None
	};

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let mut watchers = start_watchers(&endpoints, cli.output.sink(), shutdown_rx).await;

	if watchers.is_empty() {
		return Err(anyhow::anyhow!("None of the {} endpoints could be set up", endpoints.len()).into());
	}

	info!(
		endpoints = watchers.len(),
		"Listener started. Press Ctrl+C to shutdown"
	);

	let ctrl_c = tokio::signal::ctrl_c();
	if let Some(metrics_future) = metrics_server {
		tokio::select! {
			result = ctrl_c => {
				if let Err(e) = result {
					error!("Error waiting for Ctrl+C: {}", e);
				}
				info!("Shutdown signal received, stopping watchers...");
			}
			result = metrics_future => {
				if let Err(e) = result {
					error!("Metrics server error: {}", e);
				}
				info!("Metrics server stopped, stopping watchers...");
			}
		}
	} else {
		if let Err(e) = ctrl_c.await {
			error!("Error waiting for Ctrl+C: {}", e);
		}
		info!("Shutdown signal received, stopping watchers...");
	}

	let _ = shutdown_tx.send(true);
	stop_watchers(&mut watchers).await;

	info!("Shutdown complete");
	Ok(())
}
