use std::env;

use anyhow::{Context, Result};
use dotenvy::dotenv;

// public endpoints and credentials of the municipal sensor dataset
const DEFAULT_METADATA_URL: &str =
    "https://ic-metadata-service.run.aws-usw02-pr.ice.predix.io/v2/metadata";
const DEFAULT_EVENT_URL: &str = "https://ic-event-service.run.aws-usw02-pr.ice.predix.io/v2";
const DEFAULT_UAA_URL: &str =
    "https://890407d7-e617-4d70-985f-01792d693387.predix-uaa.run.aws-usw02-pr.ice.predix.io";
const DEFAULT_CLIENT_ID: &str = "hackathon";
const DEFAULT_CLIENT_SECRET: &str = "@hackathon";
const DEFAULT_PEDESTRIAN_ZONE: &str = "SDSIM-IE-PEDESTRIAN";
const DEFAULT_TRAFFIC_ZONE: &str = "SDSIM-IE-TRAFFIC";

const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_host: String,
    pub bind_port: u16,
    /// Origin the browser frontend is served from.
    pub frontend_origin: String,
    pub cityiq: CityIqConfig,
    pub places: PlacesConfig,
    pub asset: AssetConfig,
}

#[derive(Debug, Clone)]
pub struct CityIqConfig {
    pub metadata_url: String,
    pub event_url: String,
    pub uaa_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub pedestrian_zone: String,
    pub traffic_zone: String,
}

#[derive(Debug, Clone)]
pub struct PlacesConfig {
    pub api_url: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub api_url: String,
    pub zone_id: String,
    pub uaa_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Config {
    /// Reads the configuration from the environment (an `.env` file is
    /// honored). Endpoints of the public sensor dataset have defaults;
    /// credentials of the places and asset services do not and missing ones
    /// abort startup.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            bind_host: var_or("BIND_HOST", "127.0.0.1"),
            bind_port: var_or("BIND_PORT", "8081")
                .parse()
                .context("BIND_PORT must be a port number")?,
            frontend_origin: var_or("FRONTEND_ORIGIN", "http://127.0.0.1:8080"),
            cityiq: CityIqConfig {
                metadata_url: var_or("CITYIQ_METADATA_URL", DEFAULT_METADATA_URL),
                event_url: var_or("CITYIQ_EVENT_URL", DEFAULT_EVENT_URL),
                uaa_url: var_or("CITYIQ_UAA_URL", DEFAULT_UAA_URL),
                client_id: var_or("CITYIQ_CLIENT_ID", DEFAULT_CLIENT_ID),
                client_secret: var_or("CITYIQ_CLIENT_SECRET", DEFAULT_CLIENT_SECRET),
                pedestrian_zone: var_or("CITYIQ_PEDESTRIAN_ZONE", DEFAULT_PEDESTRIAN_ZONE),
                traffic_zone: var_or("CITYIQ_TRAFFIC_ZONE", DEFAULT_TRAFFIC_ZONE),
            },
            places: PlacesConfig {
                api_url: var_or("PLACES_API_URL", DEFAULT_PLACES_URL),
                key: var("PLACES_API_KEY")?,
            },
            asset: AssetConfig {
                api_url: var("ASSET_API_URL")?,
                zone_id: var("ASSET_ZONE_ID")?,
                uaa_url: var("ASSET_UAA_URL")?,
                client_id: var("ASSET_CLIENT_ID")?,
                client_secret: var("ASSET_CLIENT_SECRET")?,
            },
        })
    }
}

fn var(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} must be set"))
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
