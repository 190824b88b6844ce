//! JSON-RPC request handlers, split by domain.

mod connection;
mod index;
mod schema;
mod search;

use crate::server::AppState;
use crate::wrapper::wrap_response;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlite_search::{Result, SearchError};
use std::sync::Arc;
use tracing::{debug, error, warn};

// ============================================================================
// JSON-RPC types
// ============================================================================

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Error response carrying the core error class in `data.kind`.
    pub fn from_search_error(id: Option<Value>, err: &SearchError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: err.to_rpc_error_code(),
                message: err.to_string(),
                data: Some(json!({ "kind": err.kind() })),
            }),
            id,
        }
    }
}

// ============================================================================
// Parameter extraction helpers
// ============================================================================

fn lookup<'a>(params: &'a Value, snake: &str, camel: &str) -> Option<&'a Value> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .filter(|v| !v.is_null())
}

fn invalid(message: String) -> SearchError {
    SearchError::InvalidParams { message }
}

/// Extract an optional string parameter, supporting both snake_case and camelCase.
pub(crate) fn get_str_param<'a>(params: &'a Value, snake: &str, camel: &str) -> Option<&'a str> {
    lookup(params, snake, camel).and_then(|v| v.as_str())
}

/// Extract a required string parameter or return an error.
pub(crate) fn require_str_param(params: &Value, snake: &str, camel: &str) -> Result<String> {
    get_str_param(params, snake, camel)
        .map(String::from)
        .ok_or_else(|| invalid(format!("Missing required parameter: {}", snake)))
}

/// Extract an optional bool parameter, supporting both snake_case and camelCase.
pub(crate) fn get_bool_param(params: &Value, snake: &str, camel: &str) -> Option<bool> {
    lookup(params, snake, camel).and_then(|v| v.as_bool())
}

/// Extract an optional non-negative integer parameter.
pub(crate) fn get_u64_param(params: &Value, snake: &str, camel: &str) -> Result<Option<u64>> {
    match lookup(params, snake, camel) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid(format!("{} must be a non-negative integer", snake))),
    }
}

/// Extract an optional array of strings.
pub(crate) fn get_str_array_param(
    params: &Value,
    snake: &str,
    camel: &str,
) -> Result<Option<Vec<String>>> {
    let Some(value) = lookup(params, snake, camel) else {
        return Ok(None);
    };
    let not_strings = || invalid(format!("{} must be an array of strings", snake));
    value
        .as_array()
        .ok_or_else(not_strings)?
        .iter()
        .map(|v| v.as_str().map(String::from).ok_or_else(not_strings))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Extract a required array of strings.
pub(crate) fn require_str_array_param(
    params: &Value,
    snake: &str,
    camel: &str,
) -> Result<Vec<String>> {
    get_str_array_param(params, snake, camel)?
        .ok_or_else(|| invalid(format!("Missing required parameter: {}", snake)))
}

// ============================================================================
// HTTP endpoints
// ============================================================================

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Main JSON-RPC handler.
pub async fn handle_rpc(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let method = &request.method;
    let params = request.params.unwrap_or(Value::Object(Default::default()));
    let id = request.id.clone();

    debug!("RPC call: {}({:?})", method, params);

    if method == "health_check" {
        return (
            StatusCode::OK,
            Json(JsonRpcResponse::success(id, json!({"status": "ok"}))),
        );
    }

    match dispatch_method(&state, method, &params).await {
        Ok(value) => {
            let wrapped = wrap_response(method, value);
            (StatusCode::OK, Json(JsonRpcResponse::success(id, wrapped)))
        }
        Err(e) => {
            if e.is_rejection() {
                warn!("RPC {} rejected: {}", method, e);
            } else {
                error!("RPC error for {}: {}", method, e);
            }
            (
                StatusCode::OK,
                Json(JsonRpcResponse::from_search_error(id, &e)),
            )
        }
    }
}

// ============================================================================
// Method dispatcher
// ============================================================================

/// Dispatch a method call to the appropriate domain handler.
pub(crate) async fn dispatch_method(state: &AppState, method: &str, params: &Value) -> Result<Value> {
    match method {
        // Connection
        "connect" => connection::connect(state, params).await,
        "disconnect" => connection::disconnect(state, params).await,
        "connection_status" => connection::connection_status(state, params).await,
        "refresh_whitelist" => connection::refresh_whitelist(state, params).await,

        // Schema
        "list_columns" => schema::list_columns(state, params).await,
        "select_table" => schema::select_table(state, params).await,

        // Search
        "compile_query" => search::compile_query(state, params).await,
        "search" => search::search(state, params).await,

        // FTS5 index maintenance
        "create_fts_index" => index::create_fts_index(state, params).await,
        "optimize_fts_index" => index::optimize_fts_index(state, params).await,
        "rebuild_fts_index" => index::rebuild_fts_index(state, params).await,

        // Unknown method
        _ => Err(invalid(format!("Method not found: {}", method))),
    }
}

// ============================================================================
// Tests
// ============================================================================
