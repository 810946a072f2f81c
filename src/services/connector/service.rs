//! Chain connector: one endpoint, one client and typed read calls.

use alloy::{
	primitives::{Address, U256},
	sol_types::SolCall,
};
use std::{collections::HashMap, sync::Arc};

use crate::{
	models::{
		abi::{IFactory, IToken},
		ContractBinding, ContractKind, Endpoint,
	},
	services::blockchain::{BlockChainError, ChainClient, EvmClient, HttpTransportClient},
};

/// Connector used outside of tests
pub type EvmConnector = ChainConnector<EvmClient<HttpTransportClient>>;

/// Connected endpoint exposing contract bindings and read-only calls
pub struct ChainConnector<C: ChainClient> {
	endpoint: Endpoint,
	client: Arc<C>,
}

impl EvmConnector {
	/// Opens a JSON-RPC connection to `endpoint` and checks its chain id.
	pub async fn connect(endpoint: &Endpoint) -> Result<Self, BlockChainError> {
		let client = EvmClient::new(endpoint).await?;
		Self::connect_with_client(endpoint, client).await
	}
}

impl<C: ChainClient> ChainConnector<C> {
	/// Performs the handshake on an already created client.
	///
	/// # Errors
	/// `ConnectivityError` when the node does not answer `eth_chainId` or reports a
	/// chain id other than the configured one.
	pub async fn connect_with_client(endpoint: &Endpoint, client: C) -> Result<Self, BlockChainError> {
		let metadata = HashMap::from([
			("endpoint".to_string(), endpoint.slug.clone()),
			("expected_chain_id".to_string(), endpoint.chain_id.to_string()),
		]);

		let chain_id = client.get_chain_id().await.map_err(|e| {
			BlockChainError::connectivity_error(
				"Handshake failed",
				Some(Box::new(e)),
				Some(metadata.clone()),
			)
		})?;

		if chain_id != endpoint.chain_id {
			return Err(BlockChainError::connectivity_error(
				format!("Node reported chain id {}", chain_id),
				None,
				Some(metadata),
			));
		}

		tracing::debug!(endpoint = %endpoint.slug, chain_id, "Handshake succeeded");
		Ok(Self {
			endpoint: endpoint.clone(),
			client: Arc::new(client),
		})
	}

	pub fn endpoint(&self) -> &Endpoint {
		&self.endpoint
	}

	pub fn client(&self) -> Arc<C> {
		self.client.clone()
	}

	/// Binds a contract of `kind` at `address` to this endpoint
	pub fn bind(&self, address: Address, kind: ContractKind) -> ContractBinding {
		ContractBinding::new(address, kind, &self.endpoint.slug, &self.endpoint.symbol)
	}

	pub fn marketplace(&self) -> ContractBinding {
		self.bind(self.endpoint.marketplace_address, ContractKind::Marketplace)
	}

	pub fn factory(&self) -> ContractBinding {
		self.bind(self.endpoint.factory_address, ContractKind::Factory)
	}

	fn query_metadata(&self, binding: &ContractBinding, method: &str) -> HashMap<String, String> {
		HashMap::from([
			("endpoint".to_string(), self.endpoint.slug.clone()),
			("contract".to_string(), binding.address.to_checksum(None)),
			("method".to_string(), method.to_string()),
		])
	}

	/// Executes a typed view call on `binding` and decodes its return value
	pub async fn read<R: SolCall + Send + Sync>(
		&self,
		binding: &ContractBinding,
		call: &R,
	) -> Result<R::Return, BlockChainError> {
		let method = R::SIGNATURE;
		let data = self
			.client
			.call(binding.address, call.abi_encode().into())
			.await
			.map_err(|e| {
				BlockChainError::chain_query_error(
					"Read call failed",
					Some(Box::new(e)),
					Some(self.query_metadata(binding, method)),
				)
			})?;

		R::abi_decode_returns(&data).map_err(|e| {
			BlockChainError::chain_query_error(
				"Undecodable return data",
				Some(Box::new(e)),
				Some(self.query_metadata(binding, method)),
			)
		})
	}

	fn to_u64(&self, binding: &ContractBinding, method: &str, value: U256) -> Result<u64, BlockChainError> {
		u64::try_from(value).map_err(|e| {
			BlockChainError::chain_query_error(
				format!("Count {} does not fit in 64 bits", value),
				Some(Box::new(e)),
				Some(self.query_metadata(binding, method)),
			)
		})
	}

	/// Number of creators known to the factory
	pub async fn creators_count(&self, factory: &ContractBinding) -> Result<u64, BlockChainError> {
		let count = self
			.read(factory, &IFactory::getCreatorsCountCall {})
			.await?;
		self.to_u64(factory, IFactory::getCreatorsCountCall::SIGNATURE, count)
	}

	/// Creator stored at `index` of the factory registry
	pub async fn creator_at(
		&self,
		factory: &ContractBinding,
		index: u64,
	) -> Result<Address, BlockChainError> {
		self.read(
			factory,
			&IFactory::creatorsCall {
				index: U256::from(index),
			},
		)
		.await
	}

	/// Number of contracts deployed by `creator`
	pub async fn contract_count_of(
		&self,
		factory: &ContractBinding,
		creator: Address,
	) -> Result<u64, BlockChainError> {
		let count = self
			.read(factory, &IFactory::getContractCountOfCall { creator })
			.await?;
		self.to_u64(factory, IFactory::getContractCountOfCall::SIGNATURE, count)
	}

	/// Contract deployed by `creator` at per-creator `index`
	pub async fn contract_of(
		&self,
		factory: &ContractBinding,
		creator: Address,
		index: u64,
	) -> Result<Address, BlockChainError> {
		self.read(
			factory,
			&IFactory::ownerToContractsCall {
				owner: creator,
				index: U256::from(index),
			},
		)
		.await
	}

	/// `name()` of a token contract
	pub async fn token_name(&self, token: &ContractBinding) -> Result<String, BlockChainError> {
		self.read(token, &IToken::nameCall {}).await
	}
}
