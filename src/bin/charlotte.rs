//! Charlotte MCP server — exposes the renderer pipeline over stdio.
//!
//! Usage: charlotte  (attaches to a CDP driver already listening; set
//! driver_host/driver_port in config.toml if not 127.0.0.1:9222)

use charlotte_core::cdp::client::CdpClient;
use charlotte_core::config;
use charlotte_core::session::{PageSession, SessionRegistry};
use charlotte_core::tools::CharlotteToolServer;
use rmcp::ServiceExt;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = config::load_config()?;

    tracing::info!("connecting to CDP driver at {}:{}", config.driver_host, config.driver_port);
    let client = CdpClient::connect(&config).await?;

    let registry = Arc::new(SessionRegistry::new());
    registry.insert("default", PageSession::new(client, &config));

    let server = CharlotteToolServer::new(registry);
    let transport = tokio::io::join(tokio::io::stdin(), tokio::io::stdout());
    let service = server.serve(transport).await?;
    service.waiting().await?;
    Ok(())
}
