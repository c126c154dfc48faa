//! Common foundation for the carillon notification-preferences client.
//!
//! Holds the pieces that do not depend on any particular endpoint: the closed
//! error taxonomy every consumer sees instead of raw transport errors, a
//! minimal [`HttpClient`](http_client::HttpClient) abstraction with a `reqwest`
//! implementation, and pluggable [credential storage](store).

#![warn(missing_docs)]

pub mod error;
/// HTTP client abstraction used by carillon crates.
pub mod http_client;
/// Credential storage traits and backends.
pub mod store;

pub use error::{ErrorKind, TransportError};
pub use store::{Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore};
