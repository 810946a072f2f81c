//! Test helper utilities
//!
//! - `builders`: builders for endpoints, logs and an in-memory factory registry
//! - `mocks`: mockall doubles of the chain client and a scheduler stub (unit tests only)

pub mod builders {
	mod endpoint;
	mod log;
	mod registry;

	pub use endpoint::EndpointBuilder;
	pub use log::LogBuilder;
	pub use registry::{FactoryRegistry, DEFAULT_TOKEN_NAME};
}

#[cfg(test)]
pub mod mocks {
	use alloy::primitives::{Address, Bytes};
	use async_trait::async_trait;
	use mockall::mock;
	use tokio_cron_scheduler::Job;

	use crate::{
		models::EvmLog,
		services::{
			blockchain::{BlockChainError, ChainClient, LogFilter},
			subscription::JobSchedulerTrait,
		},
	};

	pub use super::builders::FactoryRegistry;

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

	impl FactoryRegistry {
		/// Answers every `call` of `client` from this registry
		pub fn install(self, client: &mut MockChainClient) {
			client
				.expect_call()
				.returning(move |to, data| self.respond(to, &data));
		}
	}

	/// Scheduler that accepts jobs without running them
	#[derive(Default)]
	pub struct StubScheduler;

	#[async_trait]
	impl JobSchedulerTrait for StubScheduler {
		async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
			Ok(Self)
		}

		async fn add(&self, _job: Job) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
			Ok(())
		}

		async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
			Ok(())
		}

		async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
			Ok(())
		}
	}
}
