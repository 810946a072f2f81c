use alloy::primitives::{Address, U256};
use chain_event_listener::models::{
	abi::{IFactory, IMinterMarketplace, IToken},
	ContractEvent,
};
use proptest::prelude::*;

const MAX_CREATORS: usize = 6;
const MAX_CONTRACTS_PER_CREATOR: usize = 4;

pub fn address_strategy() -> impl Strategy<Value = Address> {
	any::<[u8; 20]>().prop_map(Address::from)
}

pub fn u256_strategy() -> impl Strategy<Value = U256> {
	prop_oneof![
		any::<u64>().prop_map(U256::from),
		any::<[u8; 32]>().prop_map(U256::from_be_bytes),
	]
}

pub fn symbol_strategy() -> impl Strategy<Value = String> {
	"[A-Za-z]{1,6}"
}

/// Names as a contract might store them, without line breaks
pub fn name_strategy() -> impl Strategy<Value = String> {
	"[a-zA-Z0-9 #_-]{0,24}"
}

pub fn contract_event_strategy() -> impl Strategy<Value = ContractEvent> {
	prop_oneof![
		any::<u16>().prop_map(|fee| {
			ContractEvent::ChangedNodeFee(IMinterMarketplace::ChangedNodeFee { newFee: fee })
		}),
		(address_strategy(), any::<u16>()).prop_map(|(treasury, fee)| {
			ContractEvent::ChangedTreasuryFee(IMinterMarketplace::ChangedTreasuryFee {
				treasuryAddress: treasury,
				newTreasuryFee: fee,
			})
		}),
		(
			address_strategy(),
			address_strategy(),
			u256_strategy(),
			u256_strategy(),
			u256_strategy()
		)
			.prop_map(|(owner, contract, offer, range, token)| {
				ContractEvent::TokenMinted(IMinterMarketplace::TokenMinted {
					ownerAddress: owner,
					contractAddress: contract,
					offerIndex: offer,
					rangeIndex: range,
					tokenIndex: token,
				})
			}),
		(address_strategy(), u256_strategy(), address_strategy()).prop_map(
			|(owner, count, contract)| {
				ContractEvent::NewContractDeployed(IFactory::NewContractDeployed {
					owner,
					newContractCount: count,
					newContractAddress: contract,
				})
			}
		),
		(u256_strategy(), name_strategy(), u256_strategy()).prop_map(|(index, name, length)| {
			ContractEvent::CollectionCreated(IToken::CollectionCreated {
				index,
				name,
				length,
			})
		}),
		(address_strategy(), address_strategy(), any::<bool>()).prop_map(
			|(owner, operator, approved)| {
				ContractEvent::ApprovalForAll(IToken::ApprovalForAll {
					owner,
					operator,
					approved,
				})
			}
		),
		(address_strategy(), address_strategy(), u256_strategy()).prop_map(
			|(from, to, token_id)| {
				ContractEvent::Transfer(IToken::Transfer {
					from,
					to,
					tokenId: token_id,
				})
			}
		),
	]
}

/// Contract count of every creator in registry order
pub fn registry_shape_strategy() -> impl Strategy<Value = Vec<usize>> {
	prop::collection::vec(0..=MAX_CONTRACTS_PER_CREATOR, 0..=MAX_CREATORS)
}

/// Creators and their contracts for `shape`, every address distinct
pub fn registry_addresses(shape: &[usize]) -> Vec<(Address, Vec<Address>)> {
	let mut next_contract = 0x80u8;
	shape
		.iter()
		.enumerate()
		.map(|(index, count)| {
			let creator = Address::with_last_byte(index as u8 + 1);
			let contracts = (0..*count)
				.map(|_| {
					let contract = Address::with_last_byte(next_contract);
					next_contract += 1;
					contract
				})
				.collect();
			(creator, contracts)
		})
		.collect()
}
