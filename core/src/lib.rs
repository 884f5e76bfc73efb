//! Asynchronous JSON API client.
//!
//! # Overview
//! `ApiClient` wraps GET, POST and DELETE calls against one backend. Each
//! call sanitizes its payload, goes out through an injected `Transport`,
//! stores any access token the backend rotates in, date-shapes the JSON
//! body and decodes it into the caller's type.
//!
//! # Design
//! - `ApiClient` is stateless between calls; the only shared mutable state
//!   is the injected `TokenStore`.
//! - The network sits behind the `Transport` trait, so tests run against an
//!   in-memory fake. `ReqwestTransport` is the production implementation.
//! - Failures come in two kinds: `Error::Offline` when there is no network,
//!   and `Error::Api` for everything else, with the request and raw response
//!   attached.

pub mod auth;
pub mod client;
pub mod config;
pub mod dates;
pub mod error;
pub mod http;
pub mod query;
pub mod sanitize;
pub mod transport;
pub mod value;

pub use auth::{MemoryTokenStore, TokenStore};
pub use client::ApiClient;
pub use config::Settings;
pub use error::{ApiError, AuthError, ConfigError, ConnectivityError, Error, ErrorCause, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use sanitize::sanitize;
pub use transport::{ReqwestTransport, Transport};
pub use value::Value;
