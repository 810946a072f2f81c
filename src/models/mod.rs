//! Domain models and data structures.
//!
//! - `blockchain`: contract interfaces, RPC logs and decoded events
//! - `config`: endpoint configuration loading and validation
//! - `core`: endpoints, contract bindings and discovered contracts
//! - `security`: secrets embedded in configuration

mod blockchain;
mod config;
mod core;
mod security;

pub use blockchain::{
	abi, ContractEvent, EventDecodeError, EventKind, EventNotification, EvmLog,
};

pub use config::{builtin_endpoints, ConfigError, ConfigLoader, GOERLI_RPC_URL_ENV};

pub use core::{
	ContractBinding, ContractKind, DiscoveredContract, Endpoint, RpcUrl,
	DEFAULT_CHANNEL_CAPACITY, DEFAULT_CRON_SCHEDULE, DEFAULT_MAX_BLOCK_RANGE,
};

pub use security::{SecretString, SecretValue};
