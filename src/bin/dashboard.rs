use std::{error::Error, sync::Arc};

use tokio::net;
use tracing::info;

use sample_users::{
    dashboard::{self, Dashboard, HttpSource},
    logger, Config,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load().await?;

    logger::init(&logger::Config {
        level: config.log_level,
        service: "admin".to_owned(),
    })?;

    let dashboard = Arc::new(Dashboard::mount(HttpSource::default()));

    let listener = net::TcpListener::bind(dashboard::ADDR).await?;
    info!("Dashboard started on http://{}", listener.local_addr()?);
    axum::serve(listener, dashboard::router(dashboard)).await?;

    Ok(())
}
