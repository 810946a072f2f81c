use alloy::primitives::{Address, Bytes, B256, U64};
use serde::{Deserialize, Serialize};

/// Log entry as returned by `eth_getLogs`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvmLog {
	/// Emitting contract
	pub address: Address,

	/// Topic 0 is the event signature hash for non-anonymous events
	pub topics: Vec<B256>,

	/// ABI encoded non-indexed arguments
	pub data: Bytes,

	#[serde(rename = "blockNumber", default)]
	pub block_number: Option<U64>,

	#[serde(rename = "transactionHash", default)]
	pub transaction_hash: Option<B256>,

	#[serde(rename = "logIndex", default)]
	pub log_index: Option<U64>,

	/// Set by the node when the log was dropped by a reorg
	#[serde(default)]
	pub removed: bool,
}

impl EvmLog {
	pub fn topic0(&self) -> Option<&B256> {
		self.topics.first()
	}

	pub fn block_number(&self) -> Option<u64> {
		self.block_number.map(|n| n.to::<u64>())
	}

	pub fn log_index(&self) -> Option<u64> {
		self.log_index.map(|n| n.to::<u64>())
	}
}
