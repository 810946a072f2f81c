use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three contract interfaces the listener understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
	/// Minter marketplace selling token ranges
	Marketplace,
	/// Factory deploying token contracts and tracking their creators
	Factory,
	/// Token contract deployed by the factory
	Token,
}

impl ContractKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Marketplace => "marketplace",
			Self::Factory => "factory",
			Self::Token => "token",
		}
	}
}

impl fmt::Display for ContractKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Local handle to a deployed contract on one endpoint.
///
/// A binding always belongs to exactly one endpoint; it carries the endpoint slug and
/// symbol so that notifications can be rendered without looking the endpoint up again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractBinding {
	pub address: Address,
	pub kind: ContractKind,
	pub endpoint_slug: String,
	pub symbol: String,
}

impl ContractBinding {
	pub fn new(
		address: Address,
		kind: ContractKind,
		endpoint_slug: impl Into<String>,
		symbol: impl Into<String>,
	) -> Self {
		Self {
			address,
			kind,
			endpoint_slug: endpoint_slug.into(),
			symbol: symbol.into(),
		}
	}
}

impl fmt::Display for ContractBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} {}", self.endpoint_slug, self.kind, self.address)
	}
}

/// Contract address found while walking the factory registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscoveredContract {
	pub creator: Address,
	pub creator_index: u64,
	pub contract_index: u64,
	pub address: Address,
}
