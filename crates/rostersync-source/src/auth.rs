//! Source System authentication — OAuth2 client credentials.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{SourceError, SourceResult};

/// Safety margin subtracted from the advertised token lifetime so a token
/// is never used right at its expiry edge.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// API credentials for the Source System.
///
/// The [`Debug`] impl redacts the secret to prevent accidental credential
/// exposure in log output.
#[derive(Clone)]
pub struct SourceCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl SourceCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Cached access token with expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() >= expires_at,
            None => false,
        }
    }
}

/// Client-credentials token handler with caching.
#[derive(Debug, Clone)]
pub struct SourceAuth {
    base_url: String,
    credentials: SourceCredentials,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: reqwest::Client,
}

impl SourceAuth {
    /// Create an auth handler for the given API base URL.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        credentials: SourceCredentials,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Bearer token for API requests, fetched on first use and cached
    /// until shortly before expiry.
    pub async fn access_token(&self) -> SourceResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let token = self.fetch_token().await?;
        let mut cache = self.cached_token.write().await;
        *cache = Some(token.clone());
        Ok(token.access_token)
    }

    async fn fetch_token(&self) -> SourceResult<CachedToken> {
        let endpoint = format!("{}/oauth/access_token", self.base_url);
        debug!(endpoint = %endpoint, client_id = %self.credentials.client_id, "fetching access token");

        let response = self
            .http_client
            .post(&endpoint)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::TokenRejected { status, body });
        }

        let token: TokenResponse = response.json().await?;
        let access_token = token.access_token.ok_or(SourceError::TokenMissing)?;
        let expires_at = token
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_SKEW));

        Ok(CachedToken {
            access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = SourceCredentials::new("client-1", "super-secret");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("client-1"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_cached_token_expiry() {
        let live = CachedToken {
            access_token: "t".to_string(),
            expires_at: Some(Instant::now() + Duration::from_secs(300)),
        };
        assert!(!live.is_expired());

        let stale = CachedToken {
            access_token: "t".to_string(),
            expires_at: Some(Instant::now() - Duration::from_secs(1)),
        };
        assert!(stale.is_expired());

        let unbounded = CachedToken {
            access_token: "t".to_string(),
            expires_at: None,
        };
        assert!(!unbounded.is_expired());
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let auth = SourceAuth::new(
            "https://sis.example.com/",
            SourceCredentials::new("id", "secret"),
            reqwest::Client::new(),
        );
        assert_eq!(auth.base_url, "https://sis.example.com");
    }
}
