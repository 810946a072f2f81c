//! Registry scanner.
//!
//! Enumerates the creators known to a factory and the token contracts each of them
//! deployed, as a one-time snapshot taken at startup.

mod scanner;

pub use scanner::{RegistryEntry, RegistryScan, RegistryScanner};
