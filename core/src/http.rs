//! HTTP transport types exchanged between the pipeline and a `Transport`.
//!
//! # Design
//! Requests and responses are plain data. The pipeline builds an
//! `HttpRequest`, hands it to whatever `Transport` was injected, and gets an
//! `HttpResponse` back. Nothing in here touches the network, which keeps the
//! pipeline testable with an in-memory fake.
//!
//! All fields use owned types (`String`, `Vec`) so a request can be stored
//! inside an `ApiError` after the call has finished.

use std::fmt;
use std::time::Duration;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET and DELETE carry their payload in the query string, POST in the body.
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `query` and `body` are mutually exclusive: the pipeline fills exactly one
/// of them depending on `method`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub base_url: String,
    pub path: String,
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A request with the fixed JSON content type and no payload yet.
    pub fn new(method: HttpMethod, base_url: &str, path: &str, timeout: Duration) -> Self {
        Self {
            method,
            base_url: base_url.trim_end_matches('/').to_string(),
            path: path.to_string(),
            timeout,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            query: Vec::new(),
            body: None,
        }
    }

    /// Absolute URL without the query string.
    pub fn url(&self) -> String {
        if self.path.starts_with('/') {
            format!("{}{}", self.base_url, self.path)
        } else {
            format!("{}/{}", self.base_url, self.path)
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Header lookup, ignoring ASCII case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
