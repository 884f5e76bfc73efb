//! Process-wide request settings.
//!
//! Read once when the client is built; there is no reload.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_TOKEN_HEADER: &str = "x-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL every request path is joined onto.
    pub api_endpoint: String,
    /// Fixed timeout handed to the transport with each request.
    pub api_timeout: Duration,
    /// Response header carrying a rotated access token.
    pub token_header: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            api_timeout: DEFAULT_TIMEOUT,
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
        }
    }
}

impl Settings {
    pub fn new(api_endpoint: &str) -> Self {
        Self {
            api_endpoint: api_endpoint.to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self
    }

    /// Defaults overridden by `API_ENDPOINT`, `API_TIMEOUT_MS` and
    /// `API_TOKEN_HEADER`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(endpoint) = lookup("API_ENDPOINT") {
            if endpoint.trim().is_empty() {
                return Err(ConfigError::Empty { name: "API_ENDPOINT" });
            }
            settings.api_endpoint = endpoint;
        }

        if let Some(raw) = lookup("API_TIMEOUT_MS") {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                name: "API_TIMEOUT_MS",
                value: raw.clone(),
            })?;
            settings.api_timeout = Duration::from_millis(millis);
        }

        if let Some(header) = lookup("API_TOKEN_HEADER") {
            if header.trim().is_empty() {
                return Err(ConfigError::Empty { name: "API_TOKEN_HEADER" });
            }
            settings.token_header = header;
        }

        Ok(settings)
    }
}
