use filestage_api::server::UploadServer;
use filestage_api::setup::server::shutdown_signal;
use filestage_api::telemetry;
use filestage_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    telemetry::init_telemetry();

    let config = Config::from_env()?;

    let server = UploadServer::shared(config).await?;
    server.start().await?;

    shutdown_signal().await;
    server.stop().await;

    Ok(())
}
