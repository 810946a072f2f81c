//! EVM contract event listener.
//!
//! Connects to a set of EVM networks, binds each network's marketplace and factory
//! contracts, discovers the token contracts deployed through the factory and prints a
//! human-readable line for every event those contracts emit.
//!
//! # Module Structure
//!
//! - `bootstrap`: loads configuration and starts one watcher per endpoint
//! - `models`: endpoints, contract bindings, contract interfaces and decoded events
//! - `repositories`: endpoint configuration storage
//! - `services`: connector, registry scan, subscriptions, formatting and watchers
//! - `utils`: logging, metrics, HTTP and parsing helpers, test builders

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
