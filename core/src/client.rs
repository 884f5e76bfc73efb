//! The request pipeline: one async call per HTTP verb.
//!
//! # Design
//! `ApiClient` holds the settings and two injected collaborators, a
//! `Transport` and a `TokenStore`, and no per-call state. Every call runs the
//! same steps in order:
//!
//! 1. build the request (POST bodies are sanitized, GET/DELETE params become
//!    query pairs);
//! 2. dispatch it through the transport;
//! 3. treat a non-2xx status as a failure;
//! 4. if the response rotates the access token, commit it to the store and
//!    wait for that to finish;
//! 5. date-shape the body and decode it into the caller's type.
//!
//! Step 4 always completes before the call resolves, so whoever sees the
//! result also sees the new token. A transport failure that means "no
//! network" comes back as `Error::Offline` untouched; any other failure is
//! wrapped in an `ApiError` with the request and raw response attached.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::config::Settings;
use crate::dates;
use crate::error::{ApiError, AuthError, ConnectivityError, Error, ErrorCause, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query;
use crate::sanitize::sanitize;
use crate::transport::Transport;
use crate::value;

/// Asynchronous client for a JSON backend.
#[derive(Clone)]
pub struct ApiClient {
    settings: Settings,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Failure inside the pipeline, before it is normalized.
enum Failure {
    Offline(ConnectivityError),
    Api {
        response: Option<HttpResponse>,
        cause: ErrorCause,
    },
}

impl Failure {
    fn api(response: Option<HttpResponse>, cause: ErrorCause) -> Self {
        Failure::Api { response, cause }
    }
}

impl ApiClient {
    pub fn new(settings: Settings, transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            settings,
            transport,
            tokens,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn get<T, P>(&self, path: &str, params: Option<&P>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.request(HttpMethod::Get, path, params).await
    }

    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Post, path, body).await
    }

    pub async fn delete<T, P>(&self, path: &str, params: Option<&P>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.request(HttpMethod::Delete, path, params).await
    }

    /// `get` without params. Saves callers naming a payload type for `None`.
    pub async fn get_path<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request::<T, Json>(HttpMethod::Get, path, None).await
    }

    /// `post` without a body.
    pub async fn post_path<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request::<T, Json>(HttpMethod::Post, path, None).await
    }

    pub async fn delete_path<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request::<T, Json>(HttpMethod::Delete, path, None).await
    }

    async fn request<T, P>(&self, method: HttpMethod, path: &str, payload: Option<&P>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let mut request = HttpRequest::new(
            method,
            &self.settings.api_endpoint,
            path,
            self.settings.api_timeout,
        );

        if let Err(cause) = attach_payload(&mut request, payload) {
            warn!(%method, path, error = %cause, "request payload rejected");
            return Err(ApiError::new(request, None, cause).into());
        }

        match self.execute(&request).await {
            Ok(value) => Ok(value),
            Err(Failure::Offline(err)) => {
                warn!(%method, path, "no network connectivity");
                Err(Error::Offline(err))
            }
            Err(Failure::Api { response, cause }) => {
                warn!(
                    %method,
                    path,
                    status = response.as_ref().map(|r| r.status),
                    error = %cause,
                    "request failed"
                );
                Err(ApiError::new(request, response, cause).into())
            }
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: &HttpRequest) -> Result<T, Failure> {
        debug!(method = %request.method, url = %request.url(), query = request.query.len(), "dispatching request");

        let response = match self.transport.perform(request).await {
            Ok(response) => response,
            Err(TransportError::Offline(err)) => return Err(Failure::Offline(err)),
            Err(err) => return Err(Failure::api(None, ErrorCause::Transport(err))),
        };

        if !response.is_success() {
            let status = response.status;
            return Err(Failure::api(Some(response), ErrorCause::Status(status)));
        }

        if let Err(err) = self.intercept_token(&response).await {
            return Err(Failure::api(Some(response), ErrorCause::Auth(err)));
        }

        let body: Json = if response.body.trim().is_empty() {
            Json::Null
        } else {
            match serde_json::from_str(&response.body) {
                Ok(body) => body,
                Err(err) => return Err(Failure::api(Some(response), ErrorCause::Malformed(err))),
            }
        };

        value::from_value(dates::shape(body)).map_err(|err| Failure::api(Some(response), ErrorCause::Decode(err)))
    }

    /// Commit a rotated token before the response is handed on.
    async fn intercept_token(&self, response: &HttpResponse) -> Result<(), AuthError> {
        let Some(token) = response
            .header(&self.settings.token_header)
            .filter(|token| !token.is_empty())
        else {
            return Ok(());
        };
        debug!(header = %self.settings.token_header, "rotating access token");
        self.tokens.set_access_token(token).await
    }
}

/// Fill the query string (GET, DELETE) or the body (POST), never both.
fn attach_payload<P>(request: &mut HttpRequest, payload: Option<&P>) -> Result<(), ErrorCause>
where
    P: Serialize + ?Sized,
{
    let Some(payload) = payload else {
        return Ok(());
    };
    let json = serde_json::to_value(payload).map_err(ErrorCause::Encode)?;

    if request.method.sends_body() {
        let body = serde_json::to_string(&sanitize(json)).map_err(ErrorCause::Encode)?;
        request.body = Some(body);
    } else {
        request.query = query::encode(&json)?;
    }
    Ok(())
}
