//! CLI entry point: builds a `Session<BleTransport>`, wraps it in the Tool
//! Surface, and serves it as an MCP server over stdio.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::service::ServiceExt;
use rmcp::transport::stdio;
use tracing::info;

use thingy52_mcp_bridge::mcp_server::Thingy52Server;
use thingy52_mcp_bridge::session::Session;
use thingy52_mcp_bridge::tools::ToolSurface;
use thingy52_mcp_bridge::transport::ble::BleTransport;

#[derive(Parser, Debug)]
#[command(name = "thingy52-mcp-bridge")]
#[command(about = "MCP bridge for a Nordic Thingy:52 BLE peripheral", long_about = None)]
struct Args {
    /// Enable verbose (debug-level) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr: stdout is the MCP transport's wire, per spec §4.7.
    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("thingy52_mcp_bridge={level}"))
        .with_writer(std::io::stderr)
        .init();

    info!("thingy52-mcp-bridge starting");

    let transport = BleTransport::first_adapter()
        .await
        .context("failed to acquire a BLE adapter")?;
    let session = Arc::new(Session::new(transport));
    let tools = ToolSurface::new(session);
    let server = Thingy52Server::new(tools);

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server over stdio")?;

    info!("serving MCP tool calls over stdio");
    service.waiting().await.context("MCP server exited with an error")?;

    Ok(())
}
