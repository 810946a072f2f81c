//! Chain connector.
//!
//! Wraps one endpoint and its client: connection handshake, contract bindings and the
//! typed read-only calls used by the registry scan.

mod service;

pub use service::{ChainConnector, EvmConnector};
