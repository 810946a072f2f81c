//! Property-based tests for event line formatting.
//!
//! Rendering must be a pure function of the symbol, the contract and the event, and
//! every event must render as a single line carrying the endpoint symbol.

use chain_event_listener::{
	models::{ContractEvent, ContractKind},
	services::notification::{display_address, event_arguments, format_line},
	utils::tests::builders::LogBuilder,
};
use proptest::{prelude::*, test_runner::Config};

use crate::properties::strategies::{address_strategy, contract_event_strategy, symbol_strategy};

fn encode_and_decode(contract: alloy::primitives::Address, event: &ContractEvent) -> ContractEvent {
	let builder = LogBuilder::new().address(contract);
	let builder = match event {
		ContractEvent::ChangedNodeFee(e) => builder.event(e),
		ContractEvent::ChangedTreasuryFee(e) => builder.event(e),
		ContractEvent::TokenMinted(e) => builder.event(e),
		ContractEvent::NewContractDeployed(e) => builder.event(e),
		ContractEvent::CollectionCreated(e) => builder.event(e),
		ContractEvent::ApprovalForAll(e) => builder.event(e),
		ContractEvent::Transfer(e) => builder.event(e),
		other => panic!("no strategy produces {:?}", other.kind()),
	};
	ContractEvent::decode_log(event.kind().contract_kind(), &builder.build()).unwrap()
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	/// Rendering the same event twice gives the same line
	#[test]
	fn test_format_line_is_deterministic(
		symbol in symbol_strategy(),
		contract in address_strategy(),
		event in contract_event_strategy(),
	) {
		let contract = display_address(&contract);
		prop_assert_eq!(
			format_line(&symbol, &contract, &event),
			format_line(&symbol, &contract, &event)
		);
	}

	/// Lines start with the symbol and name their contract by role or address
	#[test]
	fn test_format_line_shape(
		symbol in symbol_strategy(),
		contract in address_strategy(),
		event in contract_event_strategy(),
	) {
		let contract = display_address(&contract);
		let line = format_line(&symbol, &contract, &event);

		prop_assert!(!line.contains('\n'));
		let expected_prefix = match event.kind().contract_kind() {
			ContractKind::Marketplace => format!("{} Minter Marketplace", symbol),
			ContractKind::Factory => format!("{} Factory: ", symbol),
			ContractKind::Token => format!("{} {}", symbol, contract),
		};
		prop_assert!(line.starts_with(&expected_prefix), "{}", line);
	}

	/// Every rendered argument value shows up in the line
	#[test]
	fn test_arguments_appear_in_line(
		symbol in symbol_strategy(),
		contract in address_strategy(),
		event in contract_event_strategy(),
	) {
		let line = format_line(&symbol, &display_address(&contract), &event);
		for (name, value) in event_arguments(&event) {
			if name == "approved" {
				continue;
			}
			prop_assert!(line.contains(&value), "{} = {} missing from {}", name, value, line);
		}
	}

	/// Logs built from an event decode back to the same event
	#[test]
	fn test_log_decoding_recovers_event(
		contract in address_strategy(),
		event in contract_event_strategy(),
	) {
		prop_assert_eq!(encode_and_decode(contract, &event), event);
	}
}
