//! Compiled contract interfaces.
//!
//! Event signatures and view functions of the minter marketplace, the factory and the
//! tokens it deploys. Topic hashes and calldata are derived from these declarations,
//! never written by hand.

use alloy::sol;

sol! {
	#[derive(Debug, PartialEq, Eq)]
	interface IMinterMarketplace {
		event AddedOffer(address contractAddress, uint256 productIndex, uint256 rangesCreated, uint256 catalogIndex);
		event AppendedRange(address contractAddress, uint256 productIndex, uint256 offerIndex, uint256 rangeIndex, uint256 startingToken, uint256 endingToken, uint256 priceOfToken, string nameOfRange);
		event ChangedNodeFee(uint16 newFee);
		event ChangedTreasury(address newAddress);
		event ChangedTreasuryFee(address treasuryAddress, uint16 newTreasuryFee);
		event SoldOut(address contractAddress, uint256 offerIndex, uint256 rangeIndex);
		event TokenMinted(address ownerAddress, address contractAddress, uint256 offerIndex, uint256 rangeIndex, uint256 tokenIndex);
		event UpdatedOffer(address contractAddress, uint256 offerIndex, uint256 rangeIndex, uint256 tokensAllowed, uint256 individualPrice, string rangeName);
	}
}

sol! {
	#[derive(Debug, PartialEq, Eq)]
	interface IFactory {
		event TokensWithdrawn(address recipient, address contractAddress, uint256 amount);
		event NewContractDeployed(address owner, uint256 newContractCount, address newContractAddress);
		event NewTokensAccepted(address tokenAddress, uint256 amountNeeded);
		event TokenNoLongerAccepted(address tokenAddress);

		function getCreatorsCount() external view returns (uint256);
		function creators(uint256 index) external view returns (address);
		function getContractCountOf(address creator) external view returns (uint256);
		function ownerToContracts(address owner, uint256 index) external view returns (address);
	}
}

sol! {
	#[derive(Debug, PartialEq, Eq)]
	interface IToken {
		event RangeLocked(uint256 productIndex, uint256 startingToken, uint256 endingToken, uint256 numberRequired, string productName);
		event RangeUnlocked(uint256 productIndex, uint256 startingToken, uint256 endingToken);
		event CollectionCreated(uint256 index, string name, uint256 length);
		event Approval(address indexed owner, address indexed approved, uint256 indexed tokenId);
		event ApprovalForAll(address indexed owner, address indexed operator, bool approved);
		event CollectionCompleted(uint256 collectionId, string name);
		event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

		function name() external view returns (string);
	}
}
