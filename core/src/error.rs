//! Error types for the request pipeline.
//!
//! # Design
//! Callers see two kinds of failure. `Error::Offline` means the host has no
//! network at all; it is handed back exactly as the transport produced it so
//! the caller can switch to an offline mode. Every other failure, whatever
//! its root cause, is an `ApiError` that keeps the request that was sent and
//! the raw response (when one arrived) for logging.

use std::time::Duration;

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// The host cannot reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no internet connection: {reason}")]
pub struct ConnectivityError {
    reason: String,
}

impl ConnectivityError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Failures reported by a `Transport` implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Offline(#[from] ConnectivityError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport failure: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failures reported by a `TokenStore` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token store rejected update: {0}")]
pub struct AuthError(pub String);

/// Invalid environment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid number of milliseconds: {value}")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

/// Root cause carried by an `ApiError`.
#[derive(Debug, Error)]
pub enum ErrorCause {
    /// The payload could not be serialized to JSON.
    #[error("payload could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    /// GET/DELETE params were not a keyed structure.
    #[error("query parameters must be an object, got {0}")]
    InvalidParams(&'static str),

    #[error(transparent)]
    Transport(TransportError),

    /// The server answered with a non-2xx status.
    #[error("server responded with status {0}")]
    Status(u16),

    #[error("failed to store rotated access token: {0}")]
    Auth(#[source] AuthError),

    /// The response body is not JSON.
    #[error("response body is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The shaped body does not fit the requested type.
    #[error("response body does not match the expected shape: {0}")]
    Decode(#[source] serde::de::value::Error),
}

/// A normalized failure: the request that was sent, the raw response if one
/// came back, and what went wrong.
#[derive(Debug, Error)]
#[error("{} {} failed: {cause}", .request.method, .request.url())]
pub struct ApiError {
    request: HttpRequest,
    response: Option<HttpResponse>,
    #[source]
    cause: ErrorCause,
}

impl ApiError {
    pub fn new(request: HttpRequest, response: Option<HttpResponse>, cause: ErrorCause) -> Self {
        Self {
            request,
            response,
            cause,
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    pub fn cause(&self) -> &ErrorCause {
        &self.cause
    }

    /// Status of the raw response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

/// Errors returned by `ApiClient` calls.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Offline(#[from] ConnectivityError),

    #[error(transparent)]
    Api(#[from] Box<ApiError>),
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(Box::new(err))
    }
}

impl Error {
    pub fn is_offline(&self) -> bool {
        matches!(self, Error::Offline(_))
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            Error::Offline(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn request() -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, "http://localhost:3000", "/items", Duration::from_secs(5))
    }

    #[test]
    fn api_error_display_names_request_and_cause() {
        let err = ApiError::new(request(), None, ErrorCause::Status(503));
        assert_eq!(
            err.to_string(),
            "GET http://localhost:3000/items failed: server responded with status 503"
        );
    }

    #[test]
    fn api_error_exposes_raw_response() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: r#"{"error":"missing"}"#.to_string(),
        };
        let err = ApiError::new(request(), Some(response.clone()), ErrorCause::Status(404));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.response(), Some(&response));
        assert_eq!(err.request().path, "/items");
    }

    #[test]
    fn offline_error_converts_without_wrapping() {
        let offline = ConnectivityError::new("dns lookup failed");
        let err: Error = offline.clone().into();
        assert!(err.is_offline());
        assert!(err.as_api().is_none());
        match err {
            Error::Offline(inner) => assert_eq!(inner, offline),
            Error::Api(_) => panic!("connectivity error was wrapped"),
        }
    }

    #[test]
    fn transport_timeout_display() {
        let err = TransportError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "request timed out after 250ms");
    }
}
