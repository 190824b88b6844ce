//! Table and column handlers.

use super::require_str_param;
use crate::server::AppState;
use serde_json::Value;
use sqlite_search::Result;

pub async fn list_columns(state: &AppState, params: &Value) -> Result<Value> {
    let table = require_str_param(params, "table", "table")?;
    let columns = state.api.list_columns(&table).await?;
    Ok(serde_json::to_value(columns)?)
}

pub async fn select_table(state: &AppState, params: &Value) -> Result<Value> {
    let table = require_str_param(params, "table", "table")?;
    let columns = state.api.select_table(&table).await?;
    Ok(serde_json::to_value(columns)?)
}
