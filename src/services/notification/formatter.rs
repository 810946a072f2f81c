//! Event formatter.
//!
//! One template per event. Rendering is pure: the same symbol, contract and event always
//! produce the same line.

use alloy::primitives::Address;

use crate::models::{ContractEvent, EventNotification};

/// Renders an address in EIP-55 checksum form
pub fn display_address(address: &Address) -> String {
	address.to_checksum(None)
}

/// Renders a notification as a single line
pub fn format_notification(notification: &EventNotification) -> String {
	format_line(
		&notification.binding.symbol,
		&display_address(&notification.binding.address),
		&notification.event,
	)
}

/// Renders `event` emitted by the contract displayed as `contract` on the endpoint
/// whose currency symbol is `symbol`.
///
/// Marketplace and factory lines name the contract by role, token lines by `contract`.
pub fn format_line(symbol: &str, contract: &str, event: &ContractEvent) -> String {
	let a = display_address;
	match event {
		ContractEvent::AddedOffer(e) => format!(
			"{symbol} Minter Marketplace: Created a new offer #{} (from {}, product #{}) with {} ranges",
			e.catalogIndex,
			a(&e.contractAddress),
			e.productIndex,
			e.rangesCreated
		),
		ContractEvent::AppendedRange(e) => format!(
			"{symbol} Minter Marketplace: New range created for contract {} on product {} (offer #{} on the marketplace) as range #{}: {}, starting from {} to {} at {} each",
			a(&e.contractAddress),
			e.productIndex,
			e.offerIndex,
			e.rangeIndex,
			e.nameOfRange,
			e.startingToken,
			e.endingToken,
			e.priceOfToken
		),
		ContractEvent::ChangedNodeFee(e) => {
			format!("{symbol} Minter Marketplace updated the node fee to {}!", e.newFee)
		}
		ContractEvent::ChangedTreasury(e) => format!(
			"{symbol} Minter Marketplace updated the treasury address to {}!",
			a(&e.newAddress)
		),
		ContractEvent::ChangedTreasuryFee(e) => format!(
			"{symbol} Minter Marketplace updated the treasury ({}) fee to {}!",
			a(&e.treasuryAddress),
			e.newTreasuryFee
		),
		ContractEvent::SoldOut(e) => format!(
			"{symbol} Minter Marketplace: Range #{} from offer #{} (from {}) is sold out!",
			e.rangeIndex,
			e.offerIndex,
			a(&e.contractAddress)
		),
		ContractEvent::TokenMinted(e) => format!(
			"{symbol} Minter Marketplace: {} minted token #{} from range #{} from offer #{} (from {})!",
			a(&e.ownerAddress),
			e.tokenIndex,
			e.rangeIndex,
			e.offerIndex,
			a(&e.contractAddress)
		),
		ContractEvent::UpdatedOffer(e) => format!(
			"{symbol} Minter Marketplace: Updated the info for range #{} {} (from {}, offer #{}), {} tokens for {} each",
			e.rangeIndex,
			e.rangeName,
			a(&e.contractAddress),
			e.offerIndex,
			e.tokensAllowed,
			e.individualPrice
		),
		ContractEvent::TokensWithdrawn(e) => format!(
			"{symbol} Factory: {} ERC777 tokens from {} were withdrawn by {}",
			e.amount,
			a(&e.contractAddress),
			a(&e.recipient)
		),
		ContractEvent::NewContractDeployed(e) => format!(
			"{symbol} Factory: A new ERC721 contract has been deployed by {}, that makes {} contracts deployed, the new contract is at {} (We are NOT listening for events in that contract, relaunch the app to listen to the new events!)",
			a(&e.owner),
			e.newContractCount,
			a(&e.newContractAddress)
		),
		ContractEvent::NewTokensAccepted(e) => format!(
			"{symbol} Factory: New Tokens accepted for deployment! Now you can pay {} tokens from {} to deploy a contract",
			e.amountNeeded,
			a(&e.tokenAddress)
		),
		ContractEvent::TokenNoLongerAccepted(e) => format!(
			"{symbol} Factory: tokens from {} are no longer accepted!",
			a(&e.tokenAddress)
		),
		ContractEvent::RangeLocked(e) => format!(
			"{symbol} {contract}: locked a range of tokens inside product {} (#{}), from {} to {} have been locked until {} tokens get minted!",
			e.productName,
			e.productIndex,
			e.startingToken,
			e.endingToken,
			e.numberRequired
		),
		ContractEvent::RangeUnlocked(e) => format!(
			"{symbol} {contract}: The Range of tokens from {} to {} in product #{} have been unlocked!",
			e.startingToken,
			e.endingToken,
			e.productIndex
		),
		ContractEvent::CollectionCreated(e) => format!(
			"{symbol} {contract}: has a new collection! ID#{} called {} with {} copies!",
			e.index, e.name, e.length
		),
		ContractEvent::Approval(e) => format!(
			"{symbol} {contract}: {} approved {} to transfer token #{}!",
			a(&e.owner),
			a(&e.approved),
			e.tokenId
		),
		ContractEvent::ApprovalForAll(e) => format!(
			"{symbol} {contract}: {} {} full approval {} to transfer tokens!",
			a(&e.owner),
			if e.approved { "enabled" } else { "disabled" },
			a(&e.operator)
		),
		ContractEvent::CollectionCompleted(e) => format!(
			"{symbol} {contract} collection #{} ({}) ran out of mintable copies!",
			e.collectionId, e.name
		),
		ContractEvent::Transfer(e) => format!(
			"{symbol} {contract}: {} sent token #{} to {}!",
			a(&e.from),
			e.tokenId,
			a(&e.to)
		),
	}
}

/// Named arguments of `event` in declaration order, rendered like in [`format_line`]
pub fn event_arguments(event: &ContractEvent) -> Vec<(&'static str, String)> {
	let a = display_address;
	match event {
		ContractEvent::AddedOffer(e) => vec![
			("contractAddress", a(&e.contractAddress)),
			("productIndex", e.productIndex.to_string()),
			("rangesCreated", e.rangesCreated.to_string()),
			("catalogIndex", e.catalogIndex.to_string()),
		],
		ContractEvent::AppendedRange(e) => vec![
			("contractAddress", a(&e.contractAddress)),
			("productIndex", e.productIndex.to_string()),
			("offerIndex", e.offerIndex.to_string()),
			("rangeIndex", e.rangeIndex.to_string()),
			("startingToken", e.startingToken.to_string()),
			("endingToken", e.endingToken.to_string()),
			("priceOfToken", e.priceOfToken.to_string()),
			("nameOfRange", e.nameOfRange.clone()),
		],
		ContractEvent::ChangedNodeFee(e) => vec![("newFee", e.newFee.to_string())],
		ContractEvent::ChangedTreasury(e) => vec![("newAddress", a(&e.newAddress))],
		ContractEvent::ChangedTreasuryFee(e) => vec![
			("treasuryAddress", a(&e.treasuryAddress)),
			("newTreasuryFee", e.newTreasuryFee.to_string()),
		],
		ContractEvent::SoldOut(e) => vec![
			("contractAddress", a(&e.contractAddress)),
			("offerIndex", e.offerIndex.to_string()),
			("rangeIndex", e.rangeIndex.to_string()),
		],
		ContractEvent::TokenMinted(e) => vec![
			("ownerAddress", a(&e.ownerAddress)),
			("contractAddress", a(&e.contractAddress)),
			("offerIndex", e.offerIndex.to_string()),
			("rangeIndex", e.rangeIndex.to_string()),
			("tokenIndex", e.tokenIndex.to_string()),
		],
		ContractEvent::UpdatedOffer(e) => vec![
			("contractAddress", a(&e.contractAddress)),
			("offerIndex", e.offerIndex.to_string()),
			("rangeIndex", e.rangeIndex.to_string()),
			("tokensAllowed", e.tokensAllowed.to_string()),
			("individualPrice", e.individualPrice.to_string()),
			("rangeName", e.rangeName.clone()),
		],
		ContractEvent::TokensWithdrawn(e) => vec![
			("recipient", a(&e.recipient)),
			("contractAddress", a(&e.contractAddress)),
			("amount", e.amount.to_string()),
		],
		ContractEvent::NewContractDeployed(e) => vec![
			("owner", a(&e.owner)),
			("newContractCount", e.newContractCount.to_string()),
			("newContractAddress", a(&e.newContractAddress)),
		],
		ContractEvent::NewTokensAccepted(e) => vec![
			("tokenAddress", a(&e.tokenAddress)),
			("amountNeeded", e.amountNeeded.to_string()),
		],
		ContractEvent::TokenNoLongerAccepted(e) => vec![("tokenAddress", a(&e.tokenAddress))],
		ContractEvent::RangeLocked(e) => vec![
			("productIndex", e.productIndex.to_string()),
			("startingToken", e.startingToken.to_string()),
			("endingToken", e.endingToken.to_string()),
			("numberRequired", e.numberRequired.to_string()),
			("productName", e.productName.clone()),
		],
		ContractEvent::RangeUnlocked(e) => vec![
			("productIndex", e.productIndex.to_string()),
			("startingToken", e.startingToken.to_string()),
			("endingToken", e.endingToken.to_string()),
		],
		ContractEvent::CollectionCreated(e) => vec![
			("index", e.index.to_string()),
			("name", e.name.clone()),
			("length", e.length.to_string()),
		],
		ContractEvent::Approval(e) => vec![
			("owner", a(&e.owner)),
			("approved", a(&e.approved)),
			("tokenId", e.tokenId.to_string()),
		],
		ContractEvent::ApprovalForAll(e) => vec![
			("owner", a(&e.owner)),
			("operator", a(&e.operator)),
			("approved", e.approved.to_string()),
		],
		ContractEvent::CollectionCompleted(e) => vec![
			("collectionId", e.collectionId.to_string()),
			("name", e.name.clone()),
		],
		ContractEvent::Transfer(e) => vec![
			("from", a(&e.from)),
			("to", a(&e.to)),
			("tokenId", e.tokenId.to_string()),
		],
	}
}
