//! Authenticated fetch client for the notification-preferences service.
//!
//! Every non-success outcome of a call is normalized into [`ErrorKind`] at
//! this boundary; raw transport errors never cross it. The client reads the
//! credential store but never writes it: in particular it does not log the
//! user out on a 401, that decision belongs to the presentation layer.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, Request};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use url::Url;

use carillon_common::error::{ErrorKind, TransportError};
use carillon_common::http_client::HttpClient;
use carillon_common::store::{Credential, CredentialStore, StoreError};

use crate::types::{NotificationTypeList, NotificationTypeListResponse};

/// Fixed per-request timeout. Exceeding it surfaces as
/// [`ErrorKind::NetworkError`], like any other absent response.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Query parameters for the notification-types endpoint.
#[derive(Serialize)]
struct NotificationTypesParams<'a> {
    locale: &'a str,
}

/// Form body for the login endpoint (`application/x-www-form-urlencoded`).
#[derive(Serialize)]
struct LoginInput<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginOutput {
    access_token: Option<SmolStr>,
}

/// Client for the notification-preferences service.
///
/// Holds a base endpoint, an [`HttpClient`], and the [`CredentialStore`] the
/// credential is attached from. The store is shared, not owned: the same
/// store typically also backs the [`AuthGate`](crate::auth::AuthGate).
pub struct PreferencesClient<C, S> {
    client: Arc<C>,
    store: Arc<S>,
    base: Url,
}

impl<C, S> PreferencesClient<C, S> {
    /// Create a new client against the given base endpoint.
    pub fn new(client: Arc<C>, store: Arc<S>, base: Url) -> Self {
        Self {
            client,
            store,
            base,
        }
    }

    /// Base endpoint with `segment` appended to its path.
    fn endpoint(&self, segment: &str) -> Url {
        let mut url = self.base.clone();
        let mut path = url.path().trim_end_matches('/').to_owned();
        path.push('/');
        path.push_str(segment);
        url.set_path(&path);
        url
    }
}

impl<C, S> PreferencesClient<C, S>
where
    C: HttpClient + Send + Sync,
    S: CredentialStore,
{
    /// Fetch the list of notification types, localized for `locale`.
    ///
    /// `locale` is passed through as a request parameter; unknown locales are
    /// the service's concern, not validated here. When the store holds a
    /// credential it is attached as a bearer token; when it does not, the
    /// request goes out unauthenticated and the expected 401 comes back as
    /// [`ErrorKind::Unauthorized`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(locale = %locale))
    )]
    pub async fn fetch_notification_types(
        &self,
        locale: &str,
    ) -> Result<NotificationTypeList, ErrorKind> {
        let mut url = self.endpoint("notifications");
        let qs = serde_html_form::to_string(&NotificationTypesParams { locale })
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        url.set_query(Some(&qs));

        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(url.as_str())
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(credential) = self.store.get().await {
            builder = builder.header(AUTHORIZATION, bearer(&credential)?);
        }
        let request = builder
            .body(Vec::new())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let body = self.send(request).await?;
        let response: NotificationTypeListResponse =
            serde_json::from_slice(&body).map_err(|_| ErrorKind::generic_client_error())?;
        Ok(response.notification_types)
    }

    /// Authenticate with the service and persist the returned credential.
    ///
    /// Posts form-encoded credentials to `auth/login` and stores the
    /// `access_token` from the response. Failures are classified like any
    /// other call: bad credentials surface as
    /// [`ErrorKind::Unauthorized`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, password), fields(username = %username))
    )]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ErrorKind> {
        let form = serde_html_form::to_string(&LoginInput { username, password })
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint("auth/login").as_str())
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .body(form.into_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let body = self.send(request).await?;
        let output: LoginOutput =
            serde_json::from_slice(&body).map_err(|_| ErrorKind::generic_client_error())?;
        let Some(token) = output.access_token else {
            return Err(ErrorKind::ClientError {
                message: SmolStr::new_static("No access token received"),
            });
        };
        self.store
            .set(Credential::new(token))
            .await
            .map_err(|_| ErrorKind::generic_client_error())?;
        Ok(())
    }

    /// Erase the stored credential.
    ///
    /// Local only; the service keeps no session state worth revoking.
    pub async fn logout(&self) -> Result<(), StoreError> {
        self.store.clear().await
    }

    /// Send a built request, apply the fixed timeout, and classify every
    /// failure path. Returns the body of a success response.
    async fn send(&self, request: Request<Vec<u8>>) -> Result<Bytes, ErrorKind> {
        let response =
            match tokio::time::timeout(REQUEST_TIMEOUT, self.client.send_http(request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return Err(TransportError::Other(Box::new(e)).into()),
                Err(_) => return Err(TransportError::Timeout.into()),
            };

        let status = response.status();
        let body = Bytes::from(response.into_body());
        if !status.is_success() {
            return Err(ErrorKind::from_response(status, &body));
        }
        Ok(body)
    }
}

fn bearer(credential: &Credential) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(&format!("Bearer {}", credential.as_str()))
        .map_err(|e| TransportError::InvalidRequest(format!("invalid credential: {e}")))
}
