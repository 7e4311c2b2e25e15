//! Client for the asset-persistence service, used to keep a record of every
//! advice served. Assets live under `{api_url}/{asset_name}` and are
//! addressed by their `uri` field.

use anyhow::{bail, Context, Result};
use futures::future::try_join_all;
use reqwest::Method;

use crate::config::AssetConfig;
use crate::uaa::TokenSource;

#[derive(Debug, serde::Deserialize)]
struct AssetRef {
    uri: String,
}

pub struct AssetService {
    http: reqwest::Client,
    config: AssetConfig,
    token: TokenSource,
}

impl AssetService {
    pub fn new(http: reqwest::Client, config: AssetConfig) -> Self {
        let token = TokenSource::new(
            http.clone(),
            &config.uaa_url,
            &config.client_id,
            &config.client_secret,
        );
        Self {
            http,
            config,
            token,
        }
    }

    /// Stores one asset under `asset_name`. The service accepts arrays
    /// only, so the value is wrapped in a one-element list.
    pub async fn create_assets(&self, asset_name: &str, data: serde_json::Value) -> Result<()> {
        log::debug!("creating '{asset_name}' asset");

        let body = match data {
            serde_json::Value::Array(_) => data,
            other => serde_json::Value::Array(vec![other]),
        };

        let url = format!("{}/{asset_name}", self.config.api_url);
        let res = self
            .request(Method::POST, &url)
            .await?
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            bail!("asset creation failed: {status}: {body}");
        }

        log::debug!("'{asset_name}' asset created");
        Ok(())
    }

    /// Fetches all assets stored under `asset_name`, optionally narrowed by
    /// query parameters (`fields`, `filter`, `pageSize`).
    pub async fn get_assets(
        &self,
        asset_name: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        log::debug!("retrieving '{asset_name}' assets");

        let url = format!("{}/{asset_name}", self.config.api_url);
        let res = self
            .request(Method::GET, &url)
            .await?
            .query(query)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("cannot retrieve '{asset_name}' assets"))?;

        Ok(res.json().await?)
    }

    /// Removes a single asset by its URI.
    pub async fn remove_asset(&self, asset_uri: &str) -> Result<()> {
        log::debug!("removing asset '{asset_uri}'");

        let url = format!("{}{asset_uri}", self.config.api_url);
        self.request(Method::DELETE, &url)
            .await?
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("cannot remove asset '{asset_uri}'"))?;

        Ok(())
    }

    /// Removes every asset stored under `asset_name`. Returns how many
    /// were removed.
    pub async fn remove_assets(&self, asset_name: &str) -> Result<usize> {
        let listed = self.get_assets(asset_name, &[("fields", "uri")]).await?;
        let refs: Vec<AssetRef> =
            serde_json::from_value(listed).context("asset listing has no uris")?;

        try_join_all(refs.iter().map(|asset| self.remove_asset(&asset.uri))).await?;

        Ok(refs.len())
    }

    async fn request(&self, method: Method, url: &str) -> Result<reqwest::RequestBuilder> {
        let token = self.token.access_token().await?;

        Ok(self
            .http
            .request(method, url)
            .header("predix-zone-id", &self.config.zone_id)
            .bearer_auth(token))
    }
}
