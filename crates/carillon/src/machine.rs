//! Lifecycle of a preferences fetch, observable by the presentation layer.
//!
//! The machine owns a single [`FetchState`] value behind a
//! [`tokio::sync::watch`] channel: exactly one variant is current at any time,
//! every transition is re-emitted to subscribers, and every trigger from every
//! state has a defined next state. Failures are a state
//! ([`FetchState::Failed`]), never an error return; the machine itself does
//! not fail.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use carillon_common::error::ErrorKind;
use carillon_common::http_client::HttpClient;
use carillon_common::store::CredentialStore;

use crate::auth::{AuthDecision, AuthGate};
use crate::client::PreferencesClient;
use crate::types::NotificationTypeList;

/// Current state of the fetch lifecycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    /// Nothing requested yet. Fresh machines start here.
    #[default]
    Idle,
    /// A fetch is in flight for the most recently requested locale.
    Loading,
    /// The last fetch succeeded; the list is the server's, verbatim. An empty
    /// list is a valid loaded state, distinct from `Loading` and `Failed`.
    Loaded(NotificationTypeList),
    /// The last fetch failed, with the normalized kind. Recovery is a manual
    /// re-trigger; the machine never retries on its own.
    Failed(ErrorKind),
}

/// State machine driving [`PreferencesClient`] fetches.
///
/// One instance per mounted preferences view; single logical consumer. A new
/// trigger while a fetch is in flight supersedes it: the transition to
/// `Loading` is synchronous with the trigger (no stale payload is ever
/// observable in between), and the superseded attempt's completion is
/// discarded rather than the request hard-cancelled.
pub struct PreferencesMachine<C, S> {
    client: PreferencesClient<C, S>,
    state: watch::Sender<FetchState>,
    attempt: AtomicU64,
}

impl<C, S> PreferencesMachine<C, S> {
    /// Create a fresh machine in [`FetchState::Idle`].
    pub fn new(client: PreferencesClient<C, S>) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            client,
            state,
            attempt: AtomicU64::new(0),
        }
    }

    /// Subscribe to state transitions. Every transition is emitted, including
    /// re-entry into `Loading`.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> FetchState {
        self.state.borrow().clone()
    }
}

impl<C, S> PreferencesMachine<C, S>
where
    C: HttpClient + Send + Sync,
    S: CredentialStore,
{
    /// Trigger a fetch for `locale`: on mount, on locale change, or as a
    /// manual retry after failure.
    ///
    /// Transitions to `Loading` before suspending, then to `Loaded` or
    /// `Failed`, unless a newer trigger arrived while the fetch was in
    /// flight, in which case this attempt's result is dropped and the newer
    /// attempt owns the terminal transition.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(locale = %locale))
    )]
    pub async fn load(&self, locale: &str) {
        let attempt = self.attempt.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(FetchState::Loading);

        let result = self.client.fetch_notification_types(locale).await;

        // Superseded while in flight: a newer attempt owns the state now.
        if self.attempt.load(Ordering::SeqCst) != attempt {
            return;
        }

        let next = match result {
            Ok(list) => FetchState::Loaded(list),
            Err(kind) => FetchState::Failed(kind),
        };
        self.state.send_replace(next);
    }

    /// Run the admission check, then load. When admission is denied no fetch
    /// is attempted and the state is left untouched; gate and fetch are
    /// strictly sequential, never concurrent.
    pub async fn load_gated<G>(&self, gate: &AuthGate<G>, locale: &str) -> AuthDecision
    where
        G: CredentialStore,
    {
        let decision = gate.check().await;
        if decision == AuthDecision::Authorized {
            self.load(locale).await;
        }
        decision
    }
}
