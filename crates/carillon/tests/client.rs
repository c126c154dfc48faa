use std::collections::VecDeque;
use std::sync::Arc;

use http::{HeaderValue, Method, Response as HttpResponse, StatusCode};
use tokio::sync::Mutex;

use carillon::client::PreferencesClient;
use carillon::error::ErrorKind;
use carillon::http_client::HttpClient;
use carillon::store::{Credential, CredentialStore, MemoryCredentialStore};

#[derive(Clone, Default)]
struct MockClient {
    // Queue of HTTP responses to pop for each send_http call
    queue: Arc<Mutex<VecDeque<HttpResponse<Vec<u8>>>>>,
    // Capture requests for assertions
    log: Arc<Mutex<Vec<http::Request<Vec<u8>>>>>,
}

impl MockClient {
    async fn push(&self, resp: HttpResponse<Vec<u8>>) {
        self.queue.lock().await.push_back(resp);
    }
    async fn take_log(&self) -> Vec<http::Request<Vec<u8>>> {
        let mut log = self.log.lock().await;
        let out = std::mem::take(&mut *log);
        out
    }
}

impl HttpClient for MockClient {
    type Error = std::convert::Infallible;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl core::future::Future<
        Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>,
    > + Send {
        let log = self.log.clone();
        let queue = self.queue.clone();
        async move {
            log.lock().await.push(request);
            Ok(queue.lock().await.pop_front().expect("no queued response"))
        }
    }
}

/// Client whose requests never complete, for exercising the fixed timeout.
struct PendingClient;

impl HttpClient for PendingClient {
    type Error = std::convert::Infallible;

    fn send_http(
        &self,
        _request: http::Request<Vec<u8>>,
    ) -> impl core::future::Future<
        Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>,
    > + Send {
        std::future::pending()
    }
}

fn json_response(status: StatusCode, body: serde_json::Value) -> HttpResponse<Vec<u8>> {
    HttpResponse::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body).unwrap())
        .unwrap()
}

fn notification_types_body() -> serde_json::Value {
    serde_json::json!({
        "notification_types": [
            {
                "key": "email_alert",
                "description": "Email Alert",
                "is_active": true,
                "is_deprecated": false
            },
            {
                "key": "sms_alert",
                "description": "SMS Alert",
                "is_active": true,
                "is_deprecated": true,
                "deprecated_reason": "This type is no longer supported."
            }
        ]
    })
}

fn base() -> url::Url {
    url::Url::parse("https://example.com/api").unwrap()
}

fn client_with(
    mock: &MockClient,
    store: Arc<MemoryCredentialStore>,
) -> PreferencesClient<MockClient, MemoryCredentialStore> {
    PreferencesClient::new(Arc::new(mock.clone()), store, base())
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_attaches_bearer_and_locale() {
    let mock = MockClient::default();
    mock.push(json_response(StatusCode::OK, notification_types_body()))
        .await;

    let store = Arc::new(MemoryCredentialStore::default());
    store.set(Credential::new("tok1")).await.unwrap();
    let client = client_with(&mock, store);

    let list = client.fetch_notification_types("en").await.expect("ok");

    // Server order preserved, deprecation reason intact
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].key, "email_alert");
    assert!(!list[0].is_deprecated);
    assert_eq!(list[1].key, "sms_alert");
    assert!(list[1].is_deprecated);
    assert_eq!(
        list[1].deprecated_reason.as_deref(),
        Some("This type is no longer supported.")
    );

    let log = mock.take_log().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].method(), Method::GET);
    assert_eq!(
        log[0].uri().to_string(),
        "https://example.com/api/notifications?locale=en"
    );
    assert_eq!(
        log[0].headers().get(http::header::AUTHORIZATION),
        Some(&HeaderValue::from_static("Bearer tok1"))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_without_credential_goes_out_unauthenticated() {
    let mock = MockClient::default();
    mock.push(json_response(
        StatusCode::UNAUTHORIZED,
        serde_json::json!({"message": "Could not validate credentials."}),
    ))
    .await;

    let client = client_with(&mock, Arc::new(MemoryCredentialStore::default()));
    let err = client.fetch_notification_types("en").await.unwrap_err();
    assert_eq!(err, ErrorKind::Unauthorized);

    let log = mock.take_log().await;
    assert!(log[0].headers().get(http::header::AUTHORIZATION).is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn locale_is_form_encoded_into_the_query() {
    let mock = MockClient::default();
    mock.push(json_response(
        StatusCode::OK,
        serde_json::json!({"notification_types": []}),
    ))
    .await;

    let client = client_with(&mock, Arc::new(MemoryCredentialStore::default()));
    client.fetch_notification_types("es ES").await.expect("ok");

    let log = mock.take_log().await;
    assert_eq!(log[0].uri().query(), Some("locale=es+ES"));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_classified() {
    let mock = MockClient::default();
    mock.push(json_response(
        StatusCode::SERVICE_UNAVAILABLE,
        serde_json::json!({"message": "down for maintenance"}),
    ))
    .await;

    let client = client_with(&mock, Arc::new(MemoryCredentialStore::default()));
    let err = client.fetch_notification_types("en").await.unwrap_err();
    assert_eq!(err, ErrorKind::ServerError);
}

#[tokio::test(flavor = "multi_thread")]
async fn other_statuses_carry_the_server_message() {
    let mock = MockClient::default();
    mock.push(json_response(
        StatusCode::NOT_FOUND,
        serde_json::json!({"message": "no such thing"}),
    ))
    .await;

    let client = client_with(&mock, Arc::new(MemoryCredentialStore::default()));
    let err = client.fetch_notification_types("en").await.unwrap_err();
    assert_eq!(
        err,
        ErrorKind::ClientError {
            message: "no such thing".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn exceeding_the_fixed_timeout_is_a_network_error() {
    let store = Arc::new(MemoryCredentialStore::default());
    let client = PreferencesClient::new(Arc::new(PendingClient), store, base());

    // Paused time auto-advances past REQUEST_TIMEOUT once everything is idle
    let err = client.fetch_notification_types("en").await.unwrap_err();
    assert_eq!(err, ErrorKind::NetworkError);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_401_does_not_touch_the_stored_credential() {
    let mock = MockClient::default();
    mock.push(json_response(
        StatusCode::UNAUTHORIZED,
        serde_json::json!({"message": "expired"}),
    ))
    .await;

    let store = Arc::new(MemoryCredentialStore::default());
    store.set(Credential::new("stale")).await.unwrap();
    let client = client_with(&mock, store.clone());

    let err = client.fetch_notification_types("en").await.unwrap_err();
    assert_eq!(err, ErrorKind::Unauthorized);
    // No auto-logout: that decision belongs to the presentation layer
    assert_eq!(store.get().await, Some(Credential::new("stale")));
}

#[tokio::test(flavor = "multi_thread")]
async fn login_posts_a_form_and_stores_the_token() {
    let mock = MockClient::default();
    mock.push(json_response(
        StatusCode::OK,
        serde_json::json!({"access_token": "tok9", "token_type": "bearer"}),
    ))
    .await;

    let store = Arc::new(MemoryCredentialStore::default());
    let client = client_with(&mock, store.clone());

    client
        .login("alice@example.com", "p&ssword")
        .await
        .expect("login ok");
    assert_eq!(store.get().await, Some(Credential::new("tok9")));

    let log = mock.take_log().await;
    assert_eq!(log[0].method(), Method::POST);
    assert_eq!(
        log[0].uri().to_string(),
        "https://example.com/api/auth/login"
    );
    assert_eq!(
        log[0].headers().get(http::header::CONTENT_TYPE),
        Some(&HeaderValue::from_static(
            "application/x-www-form-urlencoded"
        ))
    );
    assert_eq!(
        std::str::from_utf8(log[0].body()).unwrap(),
        "username=alice%40example.com&password=p%26ssword"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn login_without_a_token_in_the_body_fails() {
    let mock = MockClient::default();
    mock.push(json_response(
        StatusCode::OK,
        serde_json::json!({"token_type": "bearer"}),
    ))
    .await;

    let store = Arc::new(MemoryCredentialStore::default());
    let client = client_with(&mock, store.clone());

    let err = client.login("alice@example.com", "pw").await.unwrap_err();
    assert_eq!(
        err,
        ErrorKind::ClientError {
            message: "No access token received".into()
        }
    );
    assert_eq!(store.get().await, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_clears_the_store() {
    let mock = MockClient::default();
    let store = Arc::new(MemoryCredentialStore::default());
    store.set(Credential::new("tok")).await.unwrap();
    let client = client_with(&mock, store.clone());

    client.logout().await.expect("logout ok");
    assert!(!store.has_credential().await);
    // Purely local, no HTTP traffic
    assert!(mock.take_log().await.is_empty());
}
