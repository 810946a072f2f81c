//! Errors raised while talking to a chain.
//!
//! `ConnectivityError` covers unreachable endpoints and rejected handshakes,
//! `ChainQueryError` covers error or malformed responses to read calls.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

#[derive(ThisError, Debug)]
pub enum BlockChainError {
	/// Endpoint cannot be reached or rejected the handshake
	#[error("Connectivity error: {0}")]
	ConnectivityError(ErrorContext),

	/// Node answered a query with an error or malformed data
	#[error("Chain query error: {0}")]
	ChainQueryError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl BlockChainError {
	pub fn connectivity_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConnectivityError(ErrorContext::new(msg, source, metadata))
	}

	pub fn chain_query_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ChainQueryError(ErrorContext::new(msg, source, metadata))
	}
}

impl TraceableError for BlockChainError {
	fn trace_id(&self) -> String {
		match self {
			Self::ConnectivityError(ctx) => ctx.trace_id.clone(),
			Self::ChainQueryError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
