use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use mockall::mock;
use tokio_cron_scheduler::Job;

use chain_event_listener::{
	models::EvmLog,
	services::{
		blockchain::{BlockChainError, ChainClient, LogFilter},
		subscription::JobSchedulerTrait,
	},
	utils::tests::builders::FactoryRegistry,
};

mock! {
	pub ChainClient {}

	#[async_trait]
	impl ChainClient for ChainClient {
		async fn get_chain_id(&self) -> Result<u64, BlockChainError>;
		async fn get_latest_block_number(&self) -> Result<u64, BlockChainError>;
		async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, BlockChainError>;
		async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<EvmLog>, BlockChainError>;
	}
}

mock! {
	pub JobScheduler {}

	#[async_trait]
	impl JobSchedulerTrait for JobScheduler {
		async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>>;
		async fn add(&self, job: Job) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
		async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
		async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
	}
}

/// Chain client answering `call` from `registry`
pub fn registry_client(chain_id: u64, head: u64, registry: FactoryRegistry) -> MockChainClient {
	let mut client = MockChainClient::new();
	client.expect_get_chain_id().returning(move || Ok(chain_id));
	client
		.expect_get_latest_block_number()
		.returning(move || Ok(head));
	client
		.expect_call()
		.returning(move |to, data| registry.respond(to, &data));
	client
}
