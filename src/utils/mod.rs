//! Utility modules for common functionality.
//!
//! - http: retryable HTTP client creation
//! - logging: log subscriber setup and error context
//! - metrics: prometheus metrics and the metrics server
//! - parsing: parsing helpers for sizes, hex quantities and names
//! - tests: test builders and mocks

pub mod http;
pub mod logging;
pub mod metrics;
pub mod parsing;
pub mod tests;

pub use http::*;
pub use parsing::*;
