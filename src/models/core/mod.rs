//! Core domain models: endpoints and contract bindings.

mod contract;
mod endpoint;

pub use contract::{ContractBinding, ContractKind, DiscoveredContract};
pub use endpoint::{
	Endpoint, RpcUrl, DEFAULT_CHANNEL_CAPACITY, DEFAULT_CRON_SCHEDULE, DEFAULT_MAX_BLOCK_RANGE,
};
