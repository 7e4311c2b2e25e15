//! Prints all saved advices.

use anyhow::Result;

use backend::{asset::AssetService, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let assets = AssetService::new(reqwest::Client::new(), config.asset);

    println!("Retrieving saved advices...");
    let advices = assets.get_assets("advice", &[]).await?;
    println!("{}", serde_json::to_string_pretty(&advices)?);

    Ok(())
}
