//! EVM data structures: compiled contract interfaces, RPC logs and typed events.

pub mod abi;
mod event;
mod log;

pub use event::{ContractEvent, EventDecodeError, EventKind, EventNotification};
pub use log::EvmLog;
