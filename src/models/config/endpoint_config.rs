//! Endpoint configuration loading and validation.
//!
//! Implements [`ConfigLoader`] for [`Endpoint`] so endpoints can be loaded from a
//! directory of JSON files.

use async_trait::async_trait;
use std::{collections::HashMap, fs, path::Path, str::FromStr};

use crate::{
	models::{config::error::ConfigError, ConfigLoader, Endpoint, SecretValue},
	utils::normalize_string,
};

const DEFAULT_ENDPOINT_DIR: &str = "config/endpoints";

fn endpoint_metadata(endpoint: &Endpoint) -> Option<HashMap<String, String>> {
	Some(HashMap::from([(
		"endpoint".to_string(),
		endpoint.slug.clone(),
	)]))
}

fn path_metadata(path: &Path) -> Option<HashMap<String, String>> {
	Some(HashMap::from([(
		"path".to_string(),
		path.display().to_string(),
	)]))
}

#[async_trait]
impl ConfigLoader for Endpoint {
	fn resolve_secrets(&self) -> Result<Self, ConfigError> {
		let mut endpoint = self.clone();
		for rpc_url in endpoint.rpc_urls.iter_mut() {
			let resolved = rpc_url.url.resolve().map_err(|e| {
				ConfigError::parse_error(
					"failed to resolve RPC URL",
					Some(Box::new(e)),
					endpoint_metadata(self),
				)
			})?;
			rpc_url.url = SecretValue::Plain(resolved);
		}
		Ok(endpoint)
	}

	async fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let dir = path.unwrap_or(Path::new(DEFAULT_ENDPOINT_DIR));
		if !dir.is_dir() {
			return Err(ConfigError::file_error(
				"endpoints directory not found",
				None,
				path_metadata(dir),
			));
		}

		let entries = fs::read_dir(dir).map_err(|e| {
			ConfigError::file_error(
				format!("failed to read endpoints directory: {}", e),
				Some(Box::new(e)),
				path_metadata(dir),
			)
		})?;

		let mut files = Vec::new();
		for entry in entries {
			let entry = entry.map_err(|e| {
				ConfigError::file_error(
					format!("failed to read directory entry: {}", e),
					Some(Box::new(e)),
					path_metadata(dir),
				)
			})?;
			let file_path = entry.path();
			if Self::is_json_file(&file_path) {
				files.push(file_path);
			}
		}
		files.sort();

		let mut pairs: Vec<(String, Endpoint)> = Vec::with_capacity(files.len());
		for file_path in files {
			let stem = file_path
				.file_stem()
				.and_then(|s| s.to_str())
				.unwrap_or("unknown")
				.to_string();
			let endpoint = Self::load_from_path(&file_path).await?;

			let loaded: Vec<&Endpoint> = pairs.iter().map(|(_, e)| e).collect();
			Self::validate_uniqueness(&loaded, &endpoint, &file_path.display().to_string())?;
			pairs.push((stem, endpoint));
		}

		Ok(T::from_iter(pairs))
	}

	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = fs::File::open(path).map_err(|e| {
			ConfigError::file_error(
				format!("failed to open endpoint config file: {}", e),
				Some(Box::new(e)),
				path_metadata(path),
			)
		})?;

		let endpoint: Endpoint = serde_json::from_reader(file).map_err(|e| {
			ConfigError::parse_error(
				format!("failed to parse endpoint config: {}", e),
				Some(Box::new(e)),
				path_metadata(path),
			)
		})?;

		let endpoint = endpoint.resolve_secrets()?;
		endpoint.validate()?;
		endpoint.validate_protocol();
		Ok(endpoint)
	}

	/// Validates the endpoint
	///
	/// Ensures that:
	/// - name and symbol are present and the slug is well formed
	/// - at least one enabled RPC URL exists and every URL is `http(s)`
	/// - the cron schedule parses
	/// - contract addresses are set and channel/range sizes are positive
	fn validate(&self) -> Result<(), ConfigError> {
		let fail = |msg: &str| {
			Err(ConfigError::validation_error(
				msg,
				None,
				endpoint_metadata(self),
			))
		};

		if self.name.trim().is_empty() {
			return fail("Endpoint name is required");
		}

		if self.slug.is_empty()
			|| !self
				.slug
				.chars()
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
		{
			return fail("Slug must contain only lowercase letters, numbers, and underscores");
		}

		if self.symbol.is_empty() || self.symbol.chars().any(char::is_whitespace) {
			return fail("Endpoint symbol is required and must not contain whitespace");
		}

		if !self.rpc_urls.iter().all(|rpc_url| rpc_url.type_ == "rpc") {
			return fail("RPC URL type must be one of: rpc");
		}

		if !self.rpc_urls.iter().all(|rpc_url| rpc_url.weight <= 100) {
			return fail("All RPC URL weights must be between 0 and 100");
		}

		if self.weighted_rpc_urls().is_empty() {
			return fail("At least one RPC URL with a positive weight is required");
		}

		if !self.rpc_urls.iter().all(|rpc_url| {
			!rpc_url.url.is_resolved()
				|| rpc_url.url.starts_with("http://")
				|| rpc_url.url.starts_with("https://")
		}) {
			return fail("All RPC URLs must start with http:// or https://");
		}

		if let Err(e) = cron::Schedule::from_str(&self.cron_schedule) {
			return Err(ConfigError::validation_error(
				format!("Invalid cron schedule '{}': {}", self.cron_schedule, e),
				None,
				endpoint_metadata(self),
			));
		}

		if self.factory_address.is_zero() {
			return fail("Factory address must not be the zero address");
		}

		if self.marketplace_address.is_zero() {
			return fail("Marketplace address must not be the zero address");
		}

		if self.channel_capacity == 0 {
			return fail("channel_capacity must be greater than 0");
		}

		if self.max_block_range == 0 {
			return fail("max_block_range must be greater than 0");
		}

		Ok(())
	}

	fn validate_protocol(&self) {
		for rpc_url in &self.rpc_urls {
			if rpc_url.url.starts_with("http://") {
				tracing::warn!(
					endpoint = %self.slug,
					"RPC URL uses an insecure protocol (http://), consider https://"
				);
			}
		}
	}

	fn validate_uniqueness(
		instances: &[&Self],
		current_instance: &Self,
		file_path: &str,
	) -> Result<(), ConfigError> {
		let clash = instances.iter().find(|existing| {
			existing.slug == current_instance.slug
				|| normalize_string(&existing.name) == normalize_string(&current_instance.name)
		});

		match clash {
			Some(existing) => Err(ConfigError::validation_error(
				format!(
					"Duplicate endpoint found: '{}' clashes with already loaded '{}'",
					current_instance.slug, existing.slug
				),
				None,
				Some(HashMap::from([
					("endpoint".to_string(), current_instance.slug.clone()),
					("path".to_string(), file_path.to_string()),
				])),
			)),
			None => Ok(()),
		}
	}
}
