use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::errors::{GcpApiError, GcpApiResult};

/// Token endpoint on the GCE metadata server.
pub const METADATA_TOKEN_PATH: &str =
    "/computeMetadata/v1/instance/service-accounts/default/token";

const DEFAULT_METADATA_BASE_URL: &str = "http://metadata.google.internal";

/// Refresh this long before the reported expiry so in-flight requests
/// never carry a token that dies mid-call.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Source of bearer tokens for Google API calls.
pub enum TokenSource {
    /// A fixed token supplied through configuration.
    Static(String),
    /// Tokens minted by the GCE metadata server.
    Metadata(MetadataTokenSource),
}

impl TokenSource {
    pub fn fixed(token: impl Into<String>) -> Self {
        TokenSource::Static(token.into())
    }

    pub fn metadata(client: reqwest::Client) -> Self {
        Self::metadata_with_base_url(client, DEFAULT_METADATA_BASE_URL)
    }

    pub fn metadata_with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        TokenSource::Metadata(MetadataTokenSource {
            client,
            base_url: base_url.into(),
            cached: RwLock::new(None),
        })
    }

    /// Return a token that is valid for at least the next minute.
    pub async fn token(&self) -> GcpApiResult<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata(source) => source.token().await,
        }
    }
}

/// Fetches tokens from the metadata server and caches them until shortly
/// before their reported expiry.
pub struct MetadataTokenSource {
    client: reqwest::Client,
    base_url: String,
    cached: RwLock<Option<CachedToken>>,
}

impl MetadataTokenSource {
    async fn token(&self) -> GcpApiResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Instant::now() {
                    return Ok(token.token.clone());
                }
            }
        }

        let url = format!("{}{}", self.base_url, METADATA_TOKEN_PATH);
        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| GcpApiError::TokenUnavailable {
                message: format!("Metadata server unreachable: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(GcpApiError::TokenUnavailable {
                message: format!("Metadata server returned status {}", response.status()),
            });
        }

        let body: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| GcpApiError::TokenUnavailable {
                    message: format!("Malformed token response: {}", e),
                })?;

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_MARGIN);
        let mut cached = self.cached.write().await;
        *cached = Some(CachedToken {
            token: body.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(body.access_token)
    }
}
