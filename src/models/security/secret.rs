//! Secret values that are zeroized when dropped.
//!
//! RPC URLs often embed provider API keys, so endpoint configuration stores them as a
//! [`SecretValue`] which is either the plain value or the name of an environment
//! variable holding it.

use serde::{Deserialize, Serialize};
use std::{env, fmt};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::models::ConfigError;

/// Where a secret comes from
#[derive(Clone, Serialize, Deserialize, ZeroizeOnDrop)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
#[serde(deny_unknown_fields)]
pub enum SecretValue {
	/// The secret itself
	Plain(SecretString),
	/// Name of the environment variable holding the secret
	Environment(String),
}

impl SecretValue {
	/// Returns the secret, reading the environment when needed.
	pub fn resolve(&self) -> Result<SecretString, ConfigError> {
		match self {
			Self::Plain(secret) => Ok(secret.clone()),
			Self::Environment(var) => env::var(var).map(SecretString::new).map_err(|e| {
				ConfigError::parse_error(
					format!("environment variable {} is not set", var),
					Some(Box::new(e)),
					None,
				)
			}),
		}
	}

	/// Returns true when the value is a resolved (plain) secret
	pub fn is_resolved(&self) -> bool {
		matches!(self, Self::Plain(_))
	}

	pub fn starts_with(&self, prefix: &str) -> bool {
		match self {
			Self::Plain(secret) => secret.as_str().starts_with(prefix),
			Self::Environment(var) => var.starts_with(prefix),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Self::Plain(secret) => secret.as_str().is_empty(),
			Self::Environment(var) => var.is_empty(),
		}
	}
}

impl PartialEq for SecretValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Plain(a), Self::Plain(b)) => a == b,
			(Self::Environment(a), Self::Environment(b)) => a == b,
			_ => false,
		}
	}
}

impl fmt::Debug for SecretValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Plain(_) => f.write_str("Plain(***)"),
			Self::Environment(var) => write!(f, "Environment({})", var),
		}
	}
}

impl AsRef<str> for SecretValue {
	/// Plain secrets expose their value, environment references expose the variable name.
	fn as_ref(&self) -> &str {
		match self {
			Self::Plain(secret) => secret.as_str(),
			Self::Environment(var) => var,
		}
	}
}

/// String that is wiped from memory on drop
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
	pub fn new(value: String) -> Self {
		Self(value)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString(***)")
	}
}
