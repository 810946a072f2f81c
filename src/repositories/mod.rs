//! Repository implementations for configuration management.
//!
//! - Endpoint: loads endpoint definitions from JSON files or the compiled-in list

mod endpoint;
mod error;

pub use endpoint::{EndpointRepository, EndpointRepositoryTrait};
pub use error::RepositoryError;
