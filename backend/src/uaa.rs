use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::Mutex;

// refresh this long before the token actually expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    valid_until: Instant,
}

/// Client-credentials token source for a UAA-style OAuth2 endpoint. The
/// token is cached in process and re-fetched on demand shortly before it
/// expires; concurrent callers share one fetch.
pub struct TokenSource {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(
        http: reqwest::Client,
        uaa_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Self {
        Self {
            http,
            token_url: format!("{uaa_url}/oauth/token"),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            cached: Mutex::new(None),
        }
    }

    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.valid_until {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.fetch().await?;
        let valid_for = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        let access_token = fresh.access_token.clone();
        *cached = Some(CachedToken {
            access_token: fresh.access_token,
            valid_until: Instant::now() + valid_for,
        });

        Ok(access_token)
    }

    async fn fetch(&self) -> Result<TokenResponse> {
        log::debug!("fetching access token from {}", self.token_url);

        let res = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("token request to {} failed", self.token_url))?;

        res.json().await.context("malformed token response")
    }
}
