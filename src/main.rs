use std::error::Error;

use tracing::debug;

use sample_users::{logger, server, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load().await?;

    logger::init(&logger::Config {
        level: config.log_level,
        service: "api".to_owned(),
    })?;
    debug!(environment = %config.environment, "config loaded");

    let app = server::router(&config.cors)?;

    let listener = server::start(config.port).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
