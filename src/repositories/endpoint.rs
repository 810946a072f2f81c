//! Endpoint configuration repository.
//!
//! Endpoints are read from a directory of JSON files when one is given, and from the
//! compiled-in list otherwise. The repository preserves configuration order, which is
//! the order endpoints are set up in.

#![allow(clippy::result_large_err)]

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;

use crate::{
	models::{builtin_endpoints, ConfigLoader, Endpoint},
	repositories::error::RepositoryError,
};

/// Repository holding the configured endpoints in setup order
#[derive(Clone, Debug)]
pub struct EndpointRepository {
	pub endpoints: Vec<Endpoint>,
	/// Built-in endpoints skipped because their RPC URL could not be resolved
	pub unusable: Vec<String>,
}

/// Interface for endpoint repository implementations
#[async_trait]
pub trait EndpointRepositoryTrait: Clone {
	/// Loads the repository from `path`, or from the compiled-in list when `None`
	async fn new(path: Option<&Path>) -> Result<Self, RepositoryError>
	where
		Self: Sized;

	/// Loads every endpoint file of a directory in file name order
	async fn load_all(path: &Path) -> Result<Vec<Endpoint>, RepositoryError>;

	fn get(&self, slug: &str) -> Option<Endpoint>;

	fn get_all(&self) -> Vec<Endpoint>;

	/// Slugs that are known but have no usable RPC URL
	fn unusable(&self) -> Vec<String> {
		Vec::new()
	}

	/// Restricts the endpoint list to `slugs`, keeping configuration order.
	///
	/// An empty selection keeps every endpoint; an unknown or unusable slug is an error.
	fn select(&self, slugs: &[String]) -> Result<Vec<Endpoint>, RepositoryError> {
		let unusable = self.unusable();
		if let Some(slug) = slugs.iter().find(|slug| unusable.contains(slug)) {
			return Err(RepositoryError::validation_error(
				format!("Endpoint '{}' has no usable RPC URL", slug),
				None,
				Some(HashMap::from([("endpoint".to_string(), slug.clone())])),
			));
		}
		if let Some(unknown) = slugs.iter().find(|slug| self.get(slug).is_none()) {
			return Err(RepositoryError::validation_error(
				format!("Unknown endpoint '{}'", unknown),
				None,
				Some(HashMap::from([("endpoint".to_string(), unknown.clone())])),
			));
		}
		Ok(self
			.get_all()
			.into_iter()
			.filter(|endpoint| slugs.is_empty() || slugs.contains(&endpoint.slug))
			.collect())
	}
}

impl EndpointRepository {
	/// Compiled-in endpoints with their secrets resolved.
	///
	/// A built-in endpoint whose RPC URL secret is missing from the environment cannot
	/// be reached and is skipped with a warning.
	pub fn from_builtin() -> Result<Self, RepositoryError> {
		let mut endpoints = Vec::new();
		let mut unusable = Vec::new();
		for endpoint in builtin_endpoints() {
			match endpoint.resolve_secrets() {
				Ok(resolved) => {
					resolved.validate().map_err(|e| {
						RepositoryError::load_error(
							"Invalid built-in endpoint",
							Some(Box::new(e)),
							Some(HashMap::from([(
								"endpoint".to_string(),
								resolved.slug.clone(),
							)])),
						)
					})?;
					endpoints.push(resolved);
				}
				Err(e) => {
					tracing::warn!(
						endpoint = %endpoint.slug,
						error = %e,
						"Skipping built-in endpoint without a usable RPC URL"
					);
					unusable.push(endpoint.slug);
				}
			}
		}
		Ok(Self {
			endpoints,
			unusable,
		})
	}
}

#[async_trait]
impl EndpointRepositoryTrait for EndpointRepository {
	async fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		match path {
			Some(path) => Ok(Self {
				endpoints: Self::load_all(path).await?,
				unusable: Vec::new(),
			}),
			None => Self::from_builtin(),
		}
	}

	async fn load_all(path: &Path) -> Result<Vec<Endpoint>, RepositoryError> {
		let pairs: Vec<(String, Endpoint)> = Endpoint::load_all(Some(path)).await.map_err(|e| {
			RepositoryError::load_error(
				"Failed to load endpoints",
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			)
		})?;

		if pairs.is_empty() {
			return Err(RepositoryError::load_error(
				"No endpoint configuration files found",
				None,
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			));
		}

		Ok(pairs.into_iter().map(|(_, endpoint)| endpoint).collect())
	}

	fn get(&self, slug: &str) -> Option<Endpoint> {
		self.endpoints.iter().find(|e| e.slug == slug).cloned()
	}

	fn get_all(&self) -> Vec<Endpoint> {
		self.endpoints.clone()
	}

	fn unusable(&self) -> Vec<String> {
		self.unusable.clone()
	}
}
