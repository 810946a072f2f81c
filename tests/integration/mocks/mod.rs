//! Mock implementations for testing purposes.
//!
//! - Transports: raw JSON-RPC transports for the EVM client and the endpoint manager
//! - Clients: the chain client and the job scheduler
//!
//! The mocks are implemented using the `mockall` crate.

mod clients;

#[allow(unused_imports)]
pub use clients::*;
#[allow(unused_imports)]
pub use transports::*;
