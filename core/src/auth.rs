//! Access token storage.
//!
//! The pipeline is the only writer: it stores whatever token the backend
//! rotates in through the response header. Concurrent writers race and the
//! last write wins.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::AuthError;

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a rotated token. Resolves once the token is committed.
    async fn set_access_token(&self, token: &str) -> Result<(), AuthError>;

    async fn access_token(&self) -> Option<String>;
}

/// In-process `TokenStore`.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn set_access_token(&self, token: &str) -> Result<(), AuthError> {
        if token.is_empty() {
            return Err(AuthError("empty access token".to_string()));
        }
        *self.token.write().await = Some(token.to_string());
        debug!("access token updated");
        Ok(())
    }

    async fn access_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        assert_eq!(MemoryTokenStore::new().access_token().await, None);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = MemoryTokenStore::with_token("T0");
        store.set_access_token("T1").await.unwrap();
        store.set_access_token("T2").await.unwrap();
        assert_eq!(store.access_token().await.as_deref(), Some("T2"));
    }

    #[tokio::test]
    async fn rejects_empty_token() {
        let store = MemoryTokenStore::with_token("T0");
        let err = store.set_access_token("").await.unwrap_err();
        assert_eq!(err, AuthError("empty access token".to_string()));
        assert_eq!(store.access_token().await.as_deref(), Some("T0"));
    }
}
