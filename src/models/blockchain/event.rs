//! Typed contract events.
//!
//! [`EventKind`] enumerates every event the listener subscribes to and [`ContractEvent`]
//! holds one decoded event. Both are generated from a single table so that the catalogue
//! of a contract kind, the topic hash of an event and its decoder cannot drift apart.

use alloy::{primitives::B256, sol_types::SolEvent};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

use crate::models::{
	blockchain::abi::{IFactory, IMinterMarketplace, IToken},
	ContractBinding, ContractKind, EvmLog,
};

/// Reasons a log cannot be turned into a [`ContractEvent`]
#[derive(ThisError, Debug)]
pub enum EventDecodeError {
	#[error("log has no topics")]
	MissingTopic,

	#[error("topic {topic} is not a {kind} event")]
	UnknownTopic { topic: B256, kind: ContractKind },

	#[error("failed to decode {event}: {source}")]
	Abi {
		event: EventKind,
		#[source]
		source: alloy::sol_types::Error,
	},
}

macro_rules! contract_events {
	($( $kind:ident => $iface:ident { $( $event:ident ),* $(,)? } )*) => {
		/// Every subscribable event, grouped by contract kind
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		pub enum EventKind {
			$( $( $event, )* )*
		}

		/// A decoded event with its typed arguments
		#[derive(Debug, Clone, PartialEq, Eq)]
		pub enum ContractEvent {
			$( $( $event($iface::$event), )* )*
		}

		impl EventKind {
			/// Fixed event catalogue of a contract kind
			pub fn catalogue(kind: ContractKind) -> &'static [EventKind] {
				match kind {
					$( ContractKind::$kind => &[ $( EventKind::$event, )* ], )*
				}
			}

			pub fn contract_kind(&self) -> ContractKind {
				match self {
					$( $( Self::$event => ContractKind::$kind, )* )*
				}
			}

			pub fn name(&self) -> &'static str {
				match self {
					$( $( Self::$event => stringify!($event), )* )*
				}
			}

			/// Canonical Solidity signature, e.g. `ChangedNodeFee(uint16)`
			pub fn signature(&self) -> &'static str {
				match self {
					$( $( Self::$event => <$iface::$event as SolEvent>::SIGNATURE, )* )*
				}
			}

			/// Topic 0 of logs emitted for this event
			pub fn topic(&self) -> B256 {
				match self {
					$( $( Self::$event => <$iface::$event as SolEvent>::SIGNATURE_HASH, )* )*
				}
			}
		}

		impl ContractEvent {
			pub fn kind(&self) -> EventKind {
				match self {
					$( $( Self::$event(_) => EventKind::$event, )* )*
				}
			}

			fn decode_as(
				event: EventKind,
				topics: &[B256],
				data: &[u8],
			) -> Result<Self, alloy::sol_types::Error> {
				match event {
					$( $(
						EventKind::$event => {
							<$iface::$event as SolEvent>::decode_raw_log(topics.iter().copied(), data)
								.map(Self::$event)
						}
					)* )*
				}
			}
		}
	};
}

contract_events! {
	Marketplace => IMinterMarketplace {
		AddedOffer,
		AppendedRange,
		ChangedNodeFee,
		ChangedTreasury,
		ChangedTreasuryFee,
		SoldOut,
		TokenMinted,
		UpdatedOffer,
	}
	Factory => IFactory {
		TokensWithdrawn,
		NewContractDeployed,
		NewTokensAccepted,
		TokenNoLongerAccepted,
	}
	Token => IToken {
		RangeLocked,
		RangeUnlocked,
		CollectionCreated,
		Approval,
		ApprovalForAll,
		CollectionCompleted,
		Transfer,
	}
}

impl EventKind {
	/// Looks up the event of `kind` whose topic hash is `topic`
	pub fn from_topic(kind: ContractKind, topic: &B256) -> Option<EventKind> {
		Self::catalogue(kind)
			.iter()
			.copied()
			.find(|event| event.topic() == *topic)
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl ContractEvent {
	/// Decodes a log emitted by a contract of the given kind.
	///
	/// The topic hash selects the event within the kind's catalogue, then the typed
	/// decoder of that event validates topics and data.
	pub fn decode_log(kind: ContractKind, log: &EvmLog) -> Result<Self, EventDecodeError> {
		let topic = log.topic0().ok_or(EventDecodeError::MissingTopic)?;
		let event = EventKind::from_topic(kind, topic).ok_or(EventDecodeError::UnknownTopic {
			topic: *topic,
			kind,
		})?;
		Self::decode_as(event, &log.topics, &log.data)
			.map_err(|source| EventDecodeError::Abi { event, source })
	}
}

/// A decoded event together with the binding that emitted it.
///
/// Ephemeral: produced by the log poller, consumed by one drain worker and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNotification {
	pub binding: ContractBinding,
	pub event: ContractEvent,
	pub block_number: Option<u64>,
	pub transaction_hash: Option<B256>,
}
