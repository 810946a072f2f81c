use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::models::SecretValue;

/// Default log polling schedule (seconds resolution)
pub const DEFAULT_CRON_SCHEDULE: &str = "*/4 * * * * *";
/// Default number of queued notifications per contract binding
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;
/// Default upper bound of blocks covered by one `eth_getLogs` request
pub const DEFAULT_MAX_BLOCK_RANGE: u64 = 1000;

fn default_cron_schedule() -> String {
	DEFAULT_CRON_SCHEDULE.to_string()
}

fn default_channel_capacity() -> usize {
	DEFAULT_CHANNEL_CAPACITY
}

fn default_max_block_range() -> u64 {
	DEFAULT_MAX_BLOCK_RANGE
}

fn default_rpc_type() -> String {
	"rpc".to_string()
}

fn default_weight() -> u32 {
	100
}

/// One blockchain network the listener connects to.
///
/// Created from configuration at startup and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Endpoint {
	/// Unique identifier (lowercase letters, digits, underscores)
	pub slug: String,

	/// Display name, printed once connected
	pub name: String,

	/// Chain id the node must report
	pub chain_id: u64,

	/// Native currency symbol, prefixed to every event line
	pub symbol: String,

	/// RPC URLs, tried by descending weight
	pub rpc_urls: Vec<RpcUrl>,

	/// Address of the factory contract
	pub factory_address: Address,

	/// Address of the minter marketplace contract
	pub marketplace_address: Address,

	/// Cron expression driving the log poller
	#[serde(default = "default_cron_schedule")]
	pub cron_schedule: String,

	/// Capacity of the bounded channel of each contract binding
	#[serde(default = "default_channel_capacity")]
	pub channel_capacity: usize,

	/// Maximum number of blocks requested per `eth_getLogs` call
	#[serde(default = "default_max_block_range")]
	pub max_block_range: u64,
}

/// RPC URL with its selection weight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RpcUrl {
	/// Transport type, only `rpc` is supported
	#[serde(default = "default_rpc_type")]
	pub type_: String,

	pub url: SecretValue,

	/// 0 disables the URL, higher weights are tried first
	#[serde(default = "default_weight")]
	pub weight: u32,
}

impl Endpoint {
	/// Usable RPC URLs ordered by descending weight
	pub fn weighted_rpc_urls(&self) -> Vec<&RpcUrl> {
		let mut urls: Vec<_> = self
			.rpc_urls
			.iter()
			.filter(|rpc_url| rpc_url.type_ == "rpc" && rpc_url.weight > 0)
			.collect();
		urls.sort_by(|a, b| b.weight.cmp(&a.weight));
		urls
	}
}
