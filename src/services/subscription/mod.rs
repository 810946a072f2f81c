//! Event subscriptions.
//!
//! - `manager`: registration of (binding, event) pairs and per-binding delivery channels
//! - `poller`: scheduled `eth_getLogs` polling that feeds the channels
//! - `error`: subscription error types

mod error;
mod manager;
mod poller;

pub use error::SubscriptionError;
pub use manager::{SubscriptionManager, Subscriptions};
pub use poller::{JobSchedulerTrait, LogPoller, PollOutcome};
