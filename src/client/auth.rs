//! # Token Store
//!
//! Holds the bearer tokens issued by the auth service and performs the
//! single refresh attempt the request layer is allowed per call. Token
//! issuance itself (login, registration) is an external collaborator; this
//! module only stores, serves and refreshes opaque tokens.
//!
//! A rejected or failed refresh clears both stored tokens so the caller
//! sees a clean "session expired" state instead of retrying forever with
//! dead credentials.

use std::sync::Arc;

use serde::Deserialize;

use crate::client::storage::{keys, KeyValueStore};
use crate::shared::config::Endpoints;
use crate::shared::error::Result;

/// Access/refresh token persistence and refresh.
#[derive(Debug)]
pub struct TokenStore<S> {
    store: Arc<S>,
    http: reqwest::Client,
    endpoints: Endpoints,
}

// Manual impl: `Arc<S>` clones without requiring `S: Clone`
impl<S> Clone for TokenStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            http: self.http.clone(),
            endpoints: self.endpoints.clone(),
        }
    }
}

/// Body of a successful refresh response
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

impl<S: KeyValueStore> TokenStore<S> {
    /// Create a token store over the given storage and endpoints
    pub fn new(store: Arc<S>, http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self {
            store,
            http,
            endpoints,
        }
    }

    /// Currently stored access token, if any
    pub async fn access_token(&self) -> Result<Option<String>> {
        self.store.get(keys::ACCESS_TOKEN).await
    }

    /// Currently stored refresh token, if any
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.store.get(keys::REFRESH_TOKEN).await
    }

    /// Persist a token pair after login
    pub async fn store_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        self.store.set(keys::ACCESS_TOKEN, access).await?;
        self.store.set(keys::REFRESH_TOKEN, refresh).await
    }

    /// Drop both tokens (logout / expired session)
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(keys::ACCESS_TOKEN).await?;
        self.store.remove(keys::REFRESH_TOKEN).await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Returns the new access token on success. Returns `None` when no
    /// refresh token is stored, or when the refresh is rejected or fails
    /// at the transport level; in the latter two cases both stored tokens
    /// are cleared.
    pub async fn refresh_access_token(&self) -> Result<Option<String>> {
        let Some(refresh) = self.refresh_token().await? else {
            return Ok(None);
        };

        let response = self
            .http
            .post(self.endpoints.auth_refresh())
            .json(&serde_json::json!({ "refreshToken": refresh }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "token refresh request failed");
                self.clear().await?;
                return Ok(None);
            }
        };

        if response.status().is_success() {
            let body: RefreshResponse = match response.json().await {
                Ok(body) => body,
                Err(error) => {
                    tracing::warn!(%error, "token refresh response unreadable");
                    self.clear().await?;
                    return Ok(None);
                }
            };
            if let Some(token) = body.access_token {
                self.store.set(keys::ACCESS_TOKEN, &token).await?;
                tracing::debug!("access token refreshed");
                return Ok(Some(token));
            }
        }

        tracing::warn!("token refresh rejected, clearing session");
        self.clear().await?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStore;

    fn token_store(store: Arc<MemoryStore>) -> TokenStore<MemoryStore> {
        TokenStore::new(
            store,
            reqwest::Client::new(),
            Endpoints::new("http://127.0.0.1:0"),
        )
    }

    #[tokio::test]
    async fn test_store_and_read_tokens() {
        let store = Arc::new(MemoryStore::new());
        let tokens = token_store(Arc::clone(&store));

        tokens.store_tokens("access", "refresh").await.unwrap();
        assert_eq!(tokens.access_token().await.unwrap().as_deref(), Some("access"));
        assert_eq!(tokens.refresh_token().await.unwrap().as_deref(), Some("refresh"));

        tokens.clear().await.unwrap();
        assert!(tokens.access_token().await.unwrap().is_none());
        assert!(tokens.refresh_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let store = Arc::new(MemoryStore::new());
        let tokens = token_store(store);

        let refreshed = tokens.refresh_access_token().await.unwrap();
        assert!(refreshed.is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        // Endpoint is unreachable, so the transport call fails and the
        // stored pair must be cleared.
        let store = Arc::new(MemoryStore::new());
        let tokens = token_store(Arc::clone(&store));
        tokens.store_tokens("access", "refresh").await.unwrap();

        let refreshed = tokens.refresh_access_token().await.unwrap();
        assert!(refreshed.is_none());
        assert!(tokens.access_token().await.unwrap().is_none());
        assert!(tokens.refresh_token().await.unwrap().is_none());
    }
}
