//! # Carillon
//!
//! Client library for an authenticated notification-preferences service.
//!
//! The interesting part of the problem is not the single `GET` it performs but
//! the coordination around it: an admission check before any protected fetch,
//! a `Idle → Loading → Loaded | Failed` lifecycle the presentation layer can
//! observe, and the funneling of every possible failure (connection refused,
//! timeout, 401, 500, everything else) into one closed [`ErrorKind`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use carillon::auth::{AuthDecision, AuthGate};
//! use carillon::client::PreferencesClient;
//! use carillon::machine::{FetchState, PreferencesMachine};
//! use carillon::store::FileCredentialStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(FileCredentialStore::new("/tmp/carillon-session.json"));
//!     let base = url::Url::parse("https://example.com/api").unwrap();
//!     let client = PreferencesClient::new(Arc::new(reqwest::Client::new()), store.clone(), base);
//!
//!     let gate = AuthGate::new(store);
//!     let machine = PreferencesMachine::new(client);
//!     let state = machine.subscribe();
//!
//!     // No fetch happens unless admission resolves to Authorized.
//!     match machine.load_gated(&gate, "en").await {
//!         AuthDecision::Unauthorized => eprintln!("log in first"),
//!         AuthDecision::Authorized => match &*state.borrow() {
//!             FetchState::Loaded(types) => {
//!                 for nt in types {
//!                     println!("{}: {}", nt.key, nt.description);
//!                 }
//!             }
//!             FetchState::Failed(kind) => eprintln!("failed: {kind}"),
//!             _ => unreachable!("load_gated drives the machine to a terminal state"),
//!         },
//!     }
//! }
//! ```

#![warn(missing_docs)]

/// Admission decisions for protected content.
pub mod auth;
/// The authenticated fetch client.
pub mod client;
/// The fetch-state machine observed by the presentation layer.
pub mod machine;
/// Typed data returned by the service.
pub mod types;

pub use carillon_common::*;
