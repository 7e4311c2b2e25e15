use anyhow::Result;

use backend::{api, config::Config};

#[actix_web::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = Config::from_env()?;
    log::info!(
        "advisor listening on {}:{}",
        config.bind_host,
        config.bind_port
    );

    api::new_http_server(config).await
}
