//! Client for the nearby-places search API.

use anyhow::{Context, Result};
use common::req::Place;

use crate::config::PlacesConfig;

#[derive(Debug, serde::Deserialize)]
struct NearbySearchResponse {
    results: Vec<Place>,
    #[serde(default)]
    status: String,
}

pub struct Places {
    http: reqwest::Client,
    config: PlacesConfig,
}

impl Places {
    pub fn new(http: reqwest::Client, config: PlacesConfig) -> Self {
        Self { http, config }
    }

    /// Searches places of `place_type` within `radius` meters around
    /// `location` (`"lat,lng"`).
    pub async fn search_nearby(
        &self,
        place_type: &str,
        location: &str,
        radius: &str,
    ) -> Result<Vec<Place>> {
        log::debug!("searching nearby places: type={place_type} location={location} radius={radius}");

        let url = format!("{}/nearbysearch/json", self.config.api_url);
        let res = self
            .http
            .get(&url)
            .query(&[
                ("type", place_type),
                ("location", location),
                ("radius", radius),
                ("key", self.config.key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()
            .context("nearby search failed")?;

        let body: NearbySearchResponse = res
            .json()
            .await
            .context("cannot find places in response")?;
        log::debug!("got {} places, status {}", body.results.len(), body.status);

        Ok(body.results)
    }
}
