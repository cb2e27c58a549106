//! DB Analyst MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to inspect SQL databases (PostgreSQL, MySQL) read-only.

use clap::Parser;
use db_analyst_mcp::config::{Config, TransportMode};
use db_analyst_mcp::db::SessionManager;
use db_analyst_mcp::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    init_tracing(&config);

    info!(
        transport = %config.transport,
        "Starting DB Analyst MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let session = Arc::new(SessionManager::new());

    // Eager connect so the first tool call does not pay the handshake.
    // Tools fall back to an on-demand environment connect if this fails.
    match session.connect_from_env().await {
        Ok(kind) => info!(db_type = %kind, "Connected to database from environment"),
        Err(e) => warn!(
            error = %e,
            "No database connection at startup; tools will connect on demand"
        ),
    }

    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            let transport = StdioTransport::new(session.clone());
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(
                session.clone(),
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
