//! Secret handling for configuration values such as API-keyed RPC URLs.

mod secret;

pub use secret::{SecretString, SecretValue};
