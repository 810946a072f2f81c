//! Node access for the chain connector.
//!
//! - [`ChainClient`]: read-only node operations used by the rest of the crate
//! - [`EvmClient`]: JSON-RPC implementation over a [`BlockchainTransport`]
//! - [`HttpTransportClient`]: HTTP transport with retries and URL fail-over
//! - [`BlockChainError`]: connectivity and query failures

mod client;
mod clients;
mod error;
mod transports;

pub use client::{ChainClient, LogFilter};
pub use clients::EvmClient;
pub use error::BlockChainError;
pub use transports::{
	connection_probe, BlockchainTransport, EndpointManager, HttpTransportClient,
	RotatingTransport, TransientErrorRetryStrategy, TransportError, ROTATE_ON_ERROR_CODES,
};
