//! Core services.
//!
//! - `blockchain`: JSON-RPC transport and EVM client
//! - `connector`: one connected endpoint with typed contract reads
//! - `registry`: factory registry scan
//! - `subscription`: event subscriptions, log polling and delivery
//! - `notification`: event formatting and output sinks
//! - `watcher`: per-endpoint setup and lifecycle

pub mod blockchain;
pub mod connector;
pub mod notification;
pub mod registry;
pub mod subscription;
pub mod watcher;
