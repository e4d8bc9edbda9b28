//! Bearer tokens for the Google APIs behind the classifier and the waste log.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::ports::PortError;

/// Token endpoint of the GCE / Cloud Run metadata server.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Cached tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[async_trait]
/// Source of OAuth bearer tokens, shared by every provider of a process.
pub trait TokenSource: Send + Sync {
    /// Return a token that is valid for at least the next request.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when no token can be obtained.
    async fn token(&self) -> Result<String, PortError>;
}

/// Fixed token supplied by the operator; never refreshed.
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap an already issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String, PortError> {
        Ok(self.0.clone())
    }
}

/// Response of the metadata token endpoint.
#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Service-account tokens from the metadata server, cached until shortly
/// before they expire.
pub struct MetadataTokenSource {
    client: Client,
    url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataTokenSource {
    /// Fetch tokens from the standard metadata endpoint.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_url(client, METADATA_TOKEN_URL)
    }

    /// Fetch tokens from a custom endpoint speaking the metadata protocol.
    #[must_use]
    pub fn with_url(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            cached: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Result<MetadataToken, PortError> {
        let resp = self
            .client
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PortError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        resp.json().await.map_err(PortError::from)
    }
}

#[async_trait]
impl TokenSource for MetadataTokenSource {
    async fn token(&self) -> Result<String, PortError> {
        // Held across the fetch so concurrent requests share one refresh
        let mut cached = self.cached.lock().await;
        let now = Instant::now();

        if let Some(token) = cached.as_ref()
            && token.expires_at > now + REFRESH_MARGIN
        {
            return Ok(token.value.clone());
        }

        let fresh = self.fetch().await?;
        tracing::debug!(expires_in = fresh.expires_in, "access token refreshed");
        let value = fresh.access_token.clone();
        *cached = Some(CachedToken {
            value: fresh.access_token,
            expires_at: now + Duration::from_secs(fresh.expires_in),
        });
        Ok(value)
    }
}
