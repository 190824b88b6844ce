//! Connection lifecycle handlers.

use super::get_str_param;
use crate::server::AppState;
use serde_json::{json, Value};
use sqlite_search::Result;
use std::path::Path;

pub async fn connect(state: &AppState, params: &Value) -> Result<Value> {
    let path = get_str_param(params, "path", "path").map(Path::new);
    let tables = state.api.on_connection_changed(path).await?;
    Ok(json!(tables))
}

pub async fn disconnect(state: &AppState, _params: &Value) -> Result<Value> {
    state.api.disconnect().await?;
    Ok(json!(true))
}

pub async fn connection_status(state: &AppState, _params: &Value) -> Result<Value> {
    let response = match state.api.connection_info() {
        Some(info) => json!({
            "success": true,
            "connected": true,
            "info": serde_json::to_value(info)?,
        }),
        None => json!({
            "success": true,
            "connected": false,
        }),
    };
    Ok(response)
}

pub async fn refresh_whitelist(state: &AppState, _params: &Value) -> Result<Value> {
    let tables = state.api.refresh_whitelist().await?;
    Ok(json!(tables))
}
