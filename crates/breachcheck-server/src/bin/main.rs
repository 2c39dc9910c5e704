//! Breach lookup server CLI

use anyhow::Result;
use breachcheck_server::{ServerBuilder, ServerConfig};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "breachcheck_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    tracing::info!(
        listen = %config.listen,
        data_file = ?config.data_file,
        admin = !config.no_admin,
        metrics = !config.no_metrics,
        "Starting breachcheck-server"
    );

    let server = ServerBuilder::new(config).build()?;
    server.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
