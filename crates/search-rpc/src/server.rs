//! HTTP server implementation using Axum.

use crate::handlers::{handle_health, handle_rpc};
use axum::{
    routing::{get, post},
    Router,
};
use sqlite_search::SearchApi;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Maximum number of RPC requests handled at once.
const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Application state shared across handlers.
pub struct AppState {
    /// Core search API
    pub api: SearchApi,
}

/// Build the router with its middleware stack.
pub fn build_router(api: SearchApi) -> Router {
    let state = Arc::new(AppState { api });

    // Configure CORS for the desktop frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .concurrency_limit(MAX_CONCURRENT_REQUESTS);

    Router::new()
        .route("/health", get(handle_health))
        .route("/rpc", post(handle_rpc))
        .layer(middleware)
        .layer(cors)
        .with_state(state)
}

/// Start the JSON-RPC HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(api: SearchApi, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let app = build_router(api);

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    // Bind to the address
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    // Spawn the server in the background
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
