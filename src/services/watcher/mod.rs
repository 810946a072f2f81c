//! Per-endpoint watcher lifecycle.
//!
//! - `service`: setup, running state and shutdown of one endpoint
//! - `error`: watcher error types

mod error;
mod service;

pub use error::WatcherError;
pub use service::{EndpointWatcher, EvmEndpointWatcher};
