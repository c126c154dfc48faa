//! Error types and failure classification for client operations.
//!
//! Classification overview:
//! - 401 → [`ErrorKind::Unauthorized`].
//! - 500 and above → [`ErrorKind::ServerError`].
//! - Any other non-success status → [`ErrorKind::ClientError`], carrying the
//!   server-supplied `message` when the body has one.
//! - No response at all (connect failure, timeout, unsendable request) →
//!   [`ErrorKind::NetworkError`].
//!
//! Classification is total: every failure the transport can produce maps to
//! exactly one kind, and nothing past this module sees a raw transport error.

use http::StatusCode;
use serde::Deserialize;
use smol_str::SmolStr;

/// Fallback message for client errors whose body carries no `message` field.
pub const GENERIC_CLIENT_ERROR: &str = "API error";

/// Closed set of user-facing failure categories.
///
/// This is the only error type that crosses the fetch-client boundary. The
/// kinds are deliberately coarse: the presentation layer needs to distinguish
/// "log in again" ([`Unauthorized`](ErrorKind::Unauthorized)) from "try again
/// later", nothing finer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum ErrorKind {
    /// The server rejected the credential (or its absence) with a 401.
    #[error("unauthorized")]
    #[diagnostic(code(carillon::unauthorized))]
    Unauthorized,

    /// The server responded with a 5xx status.
    #[error("server error")]
    #[diagnostic(code(carillon::server_error))]
    ServerError,

    /// No response was received: connection failure, timeout, or a request
    /// that could not be sent.
    #[error("network error")]
    #[diagnostic(code(carillon::network_error))]
    NetworkError,

    /// Any other error response, with the server's message when it sent one.
    #[error("{message}")]
    #[diagnostic(code(carillon::client_error))]
    ClientError {
        /// Server-supplied message, or [`GENERIC_CLIENT_ERROR`].
        message: SmolStr,
    },
}

/// Error body shape used by the service: `{"message": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<SmolStr>,
}

impl ErrorKind {
    /// Classify an error response that was actually received.
    ///
    /// Callers check for success first; a 2xx status never reaches this
    /// function.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized
        } else if status.is_server_error() {
            Self::ServerError
        } else {
            let message = serde_json::from_slice::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| SmolStr::new_static(GENERIC_CLIENT_ERROR));
            Self::ClientError { message }
        }
    }

    /// A [`ClientError`](ErrorKind::ClientError) with the generic fallback
    /// message, for failures with no server message at all (e.g. an
    /// undecodable success body).
    pub fn generic_client_error() -> Self {
        Self::ClientError {
            message: SmolStr::new_static(GENERIC_CLIENT_ERROR),
        }
    }
}

/// Transport-level errors that occur during HTTP communication.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// Failed to establish a connection to the server
    #[error("connection error: {0}")]
    Connect(String),

    /// Request timed out
    #[error("request timeout")]
    Timeout,

    /// Request construction failed (malformed URI, headers, etc.)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Other transport error
    #[error("transport error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl From<TransportError> for ErrorKind {
    // No response was received in any of these cases.
    fn from(_: TransportError) -> Self {
        ErrorKind::NetworkError
    }
}

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_request() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_is_unauthorized() {
        let kind = ErrorKind::from_response(StatusCode::UNAUTHORIZED, b"");
        assert_eq!(kind, ErrorKind::Unauthorized);
        // A body does not change the classification
        let kind = ErrorKind::from_response(
            StatusCode::UNAUTHORIZED,
            br#"{"message":"Could not validate credentials."}"#,
        );
        assert_eq!(kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn status_5xx_is_server_error() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let kind = ErrorKind::from_response(status, br#"{"message":"boom"}"#);
            assert_eq!(kind, ErrorKind::ServerError);
        }
    }

    #[test]
    fn other_status_is_client_error_with_server_message() {
        let kind =
            ErrorKind::from_response(StatusCode::NOT_FOUND, br#"{"message":"no such thing"}"#);
        assert_eq!(
            kind,
            ErrorKind::ClientError {
                message: "no such thing".into()
            }
        );
    }

    #[test]
    fn client_error_falls_back_when_body_is_unusable() {
        for body in [&b""[..], b"not json", br#"{"detail":"elsewhere"}"#] {
            let kind = ErrorKind::from_response(StatusCode::UNPROCESSABLE_ENTITY, body);
            assert_eq!(kind, ErrorKind::generic_client_error());
        }
    }

    #[test]
    fn every_transport_error_is_a_network_error() {
        let failures = [
            TransportError::Connect("refused".into()),
            TransportError::Timeout,
            TransportError::InvalidRequest("bad uri".into()),
            TransportError::Other("io".into()),
        ];
        for failure in failures {
            assert_eq!(ErrorKind::from(failure), ErrorKind::NetworkError);
        }
    }
}
