//! Factory registry walk.
//!
//! The factory stores its creators in an array and, per creator, the contracts they
//! deployed. The scan reads the creator count once and then lazily walks both levels in
//! ascending index order. A failed read skips the affected creator or contract only.

use alloy::primitives::Address;
use futures::stream::{self, Stream, StreamExt};

use crate::{
	models::{ContractBinding, DiscoveredContract},
	services::{
		blockchain::{BlockChainError, ChainClient},
		connector::ChainConnector,
	},
	utils::metrics::REGISTRY_ENTRIES_SKIPPED,
};

/// One step of the registry walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEntry {
	/// A creator was read together with its contract count; its contracts follow
	Creator {
		creator: Address,
		creator_index: u64,
		contract_count: u64,
	},
	/// A contract deployed by the last reported creator
	Contract(DiscoveredContract),
}

/// Creator whose contracts are being enumerated
struct CreatorCursor {
	creator: Address,
	creator_index: u64,
	contract_count: u64,
	next_contract: u64,
}

struct ScanState {
	next_creator: u64,
	current: Option<CreatorCursor>,
}

/// Walks the registry of one factory binding
pub struct RegistryScanner<'a, C: ChainClient> {
	connector: &'a ChainConnector<C>,
	factory: ContractBinding,
}

/// A started scan: the creator count and the pending walk
pub struct RegistryScan<'a, C: ChainClient> {
	pub creators_count: u64,
	scanner: RegistryScanner<'a, C>,
}

impl<'a, C: ChainClient> RegistryScanner<'a, C> {
	pub fn new(connector: &'a ChainConnector<C>, factory: ContractBinding) -> Self {
		Self { connector, factory }
	}

	/// Reads the creator count.
	///
	/// # Errors
	/// `ChainQueryError` when the count cannot be read; nothing is scanned then.
	pub async fn start(self) -> Result<RegistryScan<'a, C>, BlockChainError> {
		let creators_count = self.connector.creators_count(&self.factory).await?;
		Ok(RegistryScan {
			creators_count,
			scanner: self,
		})
	}

	fn skip(&self, what: &str, error: &BlockChainError) {
		tracing::warn!(
			endpoint = %self.factory.endpoint_slug,
			factory = %self.factory.address,
			error = %error,
			"Skipping {}",
			what
		);
		REGISTRY_ENTRIES_SKIPPED
			.with_label_values(&[&self.factory.endpoint_slug])
			.inc();
	}

	/// Reads creator `index` and its contract count
	async fn read_creator(&self, index: u64) -> Option<CreatorCursor> {
		let creator = match self.connector.creator_at(&self.factory, index).await {
			Ok(creator) => creator,
			Err(e) => {
				self.skip(&format!("creator #{}", index), &e);
				return None;
			}
		};
		let contract_count = match self
			.connector
			.contract_count_of(&self.factory, creator)
			.await
		{
			Ok(count) => count,
			Err(e) => {
				self.skip(&format!("creator #{} ({})", index, creator), &e);
				return None;
			}
		};
		Some(CreatorCursor {
			creator,
			creator_index: index,
			contract_count,
			next_contract: 0,
		})
	}
}

impl<'a, C: ChainClient + 'a> RegistryScan<'a, C> {
	/// Lazy walk yielding each creator followed by its contracts.
	///
	/// Every step performs its reads when polled; the stream is single pass.
	pub fn entries(self) -> impl Stream<Item = RegistryEntry> + 'a {
		let total = self.creators_count;
		let state = ScanState {
			next_creator: 0,
			current: None,
		};

		stream::unfold(
			(self.scanner, state),
			move |(scanner, mut state)| async move {
				loop {
					if let Some(cursor) = state.current.as_mut() {
						if cursor.next_contract < cursor.contract_count {
							let (creator, creator_index, contract_index) =
								(cursor.creator, cursor.creator_index, cursor.next_contract);
							cursor.next_contract += 1;

							match scanner
								.connector
								.contract_of(&scanner.factory, creator, contract_index)
								.await
							{
								Ok(address) => {
									let entry = RegistryEntry::Contract(DiscoveredContract {
										creator,
										creator_index,
										contract_index,
										address,
									});
									return Some((entry, (scanner, state)));
								}
								Err(e) => {
									scanner.skip(
										&format!("contract #{} of {}", contract_index, creator),
										&e,
									);
									continue;
								}
							}
						}
						state.current = None;
					}

					if state.next_creator >= total {
						return None;
					}
					let index = state.next_creator;
					state.next_creator += 1;

					if let Some(cursor) = scanner.read_creator(index).await {
						let entry = RegistryEntry::Creator {
							creator: cursor.creator,
							creator_index: cursor.creator_index,
							contract_count: cursor.contract_count,
						};
						state.current = Some(cursor);
						return Some((entry, (scanner, state)));
					}
				}
			},
		)
	}

	/// Only the discovered contracts of [`Self::entries`]
	pub fn contracts(self) -> impl Stream<Item = DiscoveredContract> + 'a {
		self.entries().filter_map(|entry| async move {
			match entry {
				RegistryEntry::Contract(contract) => Some(contract),
				RegistryEntry::Creator { .. } => None,
			}
		})
	}
}
