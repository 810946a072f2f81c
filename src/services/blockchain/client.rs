//! Chain client interface.
//!
//! The connector, the registry scanner and the log poller only need four node
//! operations; [`ChainClient`] is the seam where tests substitute a mock.

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use crate::{models::EvmLog, services::blockchain::BlockChainError};

/// Inclusive block range and address/topic filter of an `eth_getLogs` request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogFilter {
	pub from_block: u64,
	pub to_block: u64,
	/// Emitting contracts, any of
	pub addresses: Vec<Address>,
	/// Accepted topic-0 values, any of
	pub topics: Vec<B256>,
}

/// Read-only access to an EVM node
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Chain id reported by the node (`eth_chainId`)
	async fn get_chain_id(&self) -> Result<u64, BlockChainError>;

	/// Number of the most recent block (`eth_blockNumber`)
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError>;

	/// Executes a view call against the latest block and returns the raw return data
	///
	/// # Arguments
	/// * `to` - Called contract
	/// * `data` - ABI encoded calldata
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, BlockChainError>;

	/// Logs matching `filter`
	async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<EvmLog>, BlockChainError>;
}
