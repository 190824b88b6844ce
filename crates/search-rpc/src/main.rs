//! SQLite Search RPC Server - JSON-RPC backend for the desktop frontend.
//!
//! This binary provides a JSON-RPC 2.0 server that wraps the sqlite-search
//! library for communication with the frontend process.

mod handlers;
mod server;
mod wrapper;

use anyhow::Result;
use clap::Parser;
use sqlite_search::SearchApi;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sqlite-search-rpc")]
#[command(about = "JSON-RPC server for SQLite full-text search")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Database to connect to on start-up
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting SQLite Search RPC Server");

    let api = SearchApi::new();

    // A bad start-up database is not fatal; the frontend can connect later.
    if let Some(path) = args.database.as_deref() {
        match api.on_connection_changed(Some(path)).await {
            Ok(tables) => info!(
                "Connected to {} ({} FTS5 tables)",
                path.display(),
                tables.len()
            ),
            Err(e) => warn!("Could not open {}: {}", path.display(), e),
        }
    }

    // Start the server
    let addr = server::start_server(api.clone(), &args.host, args.port).await?;

    // Print port for the frontend to read (intentional stdout for IPC)
    println!("RPC_PORT={}", addr.port());

    info!("RPC server running on {}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    if let Err(e) = api.disconnect().await {
        warn!("Failed to close database on shutdown: {}", e);
    }

    Ok(())
}
