//! Admission to protected content.

use std::sync::Arc;

use carillon_common::store::CredentialStore;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// The caller may proceed to protected content.
    Authorized,
    /// The caller must (re-)authenticate first. What to render instead is the
    /// routing collaborator's decision.
    Unauthorized,
}

/// Decides admission before any protected fetch is started.
///
/// Read-only against the credential store. The check is async so that an
/// expiry or introspection step can be added later without changing the call
/// contract, but completion is bounded regardless of network state: admission
/// is a local decision.
pub struct AuthGate<S> {
    store: Arc<S>,
}

impl<S: CredentialStore> AuthGate<S> {
    /// Create a gate over the given credential store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolve the admission decision. Resolves exactly once per invocation;
    /// currently a presence check only (expiry is the server's call).
    pub async fn check(&self) -> AuthDecision {
        if self.store.has_credential().await {
            AuthDecision::Authorized
        } else {
            AuthDecision::Unauthorized
        }
    }
}
