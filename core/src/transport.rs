//! The network boundary.
//!
//! # Design
//! `ApiClient` only ever talks to a `Transport`. Production code plugs in
//! `ReqwestTransport`; tests plug in an in-memory fake that records what it
//! was asked to send. A transport reports HTTP error statuses as ordinary
//! responses; deciding what counts as a failure is the pipeline's job.

use std::error::Error as StdError;
use std::io;

use async_trait::async_trait;
use reqwest::Method;
use tracing::trace;

use crate::error::{ConnectivityError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request. Must honor `request.timeout`.
    async fn perform(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn classify(err: reqwest::Error, request: &HttpRequest) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(request.timeout)
    } else if err.is_connect() {
        connect_failure(err)
    } else {
        TransportError::Failed(Box::new(err))
    }
}

/// A host that answers with a refusal or reset is reachable; only the
/// backend is down. Lookup and routing failures mean there is no network.
fn connect_failure<E>(err: E) -> TransportError
where
    E: StdError + Send + Sync + 'static,
{
    if peer_rejected(&err) {
        TransportError::Failed(Box::new(err))
    } else {
        TransportError::Offline(ConnectivityError::new(err.to_string()))
    }
}

fn peer_rejected(err: &(dyn StdError + 'static)) -> bool {
    std::iter::successors(Some(err), |&e| e.source())
        .filter_map(|e| e.downcast_ref::<io::Error>())
        .any(|e| {
            matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            )
        })
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(method(request.method), request.url())
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| classify(e, request))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(|e| classify(e, request))?;

        trace!(status, bytes = body.len(), "transport response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
