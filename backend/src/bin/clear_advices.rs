//! Removes all saved advices.

use anyhow::Result;

use backend::{asset::AssetService, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let assets = AssetService::new(reqwest::Client::new(), config.asset);

    println!("Removing saved advices...");
    let removed = assets.remove_assets("advice").await?;
    println!("Advices cleared ({removed} removed).");

    Ok(())
}
