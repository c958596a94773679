//! HTTP server command

use std::net::IpAddr;

use anyhow::{Context, Result};
use chipstore_server::{run_server, ServerConfig};
use clap::Parser;

/// Arguments for the serve command. Flags override the corresponding
/// environment variables.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on (overrides PORT, default 5000)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Address to bind (overrides HOST, default 127.0.0.1)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// MongoDB connection string (overrides MONGODB_URI)
    #[arg(long)]
    pub mongodb_uri: Option<String>,

    /// Database name (overrides MONGODB_DB)
    #[arg(long)]
    pub database: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(uri) = args.mongodb_uri {
        config.mongodb_uri = Some(uri);
    }
    if let Some(database) = args.database {
        config.database = Some(database);
    }

    tracing::info!("Starting chipstore server on {}", config.bind_addr());

    // Blocks until shutdown
    run_server(config).await.context("Server error")?;

    Ok(())
}
