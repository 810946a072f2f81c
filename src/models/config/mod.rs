//! Configuration loading and validation.
//!
//! Endpoints come either from the compiled-in list in [`builtin_endpoints`] or from a
//! directory of JSON files, one endpoint per file.

use async_trait::async_trait;
use std::path::Path;

mod defaults;
mod endpoint_config;
mod error;

pub use defaults::{builtin_endpoints, GOERLI_RPC_URL_ENV};
pub use error::ConfigError;

/// Common interface for loading configuration files
#[async_trait]
pub trait ConfigLoader: Sized {
	/// Loads every JSON file of a directory, in file name order.
	///
	/// Keys of the returned pairs are the file stems.
	async fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>;

	/// Loads, resolves and validates a single file
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	/// Checks every constraint of a single instance
	fn validate(&self) -> Result<(), ConfigError>;

	/// Logs a warning for settings that work but are unsafe
	fn validate_protocol(&self);

	/// Replaces secret references with their values
	fn resolve_secrets(&self) -> Result<Self, ConfigError>;

	/// Rejects `current_instance` if it clashes with an already loaded instance
	fn validate_uniqueness(
		instances: &[&Self],
		current_instance: &Self,
		file_path: &str,
	) -> Result<(), ConfigError>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
			.unwrap_or(false)
	}
}
