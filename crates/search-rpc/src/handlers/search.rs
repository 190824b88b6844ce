//! Search handlers.

use super::{get_u64_param, require_str_array_param, require_str_param};
use crate::server::AppState;
use serde_json::{json, Value};
use sqlite_search::config::SearchConfig;
use sqlite_search::{Result, SearchRequest};

pub async fn compile_query(state: &AppState, params: &Value) -> Result<Value> {
    let query = require_str_param(params, "query", "query")?;
    let columns = require_str_array_param(params, "columns", "columns")?;

    let compiled = state.api.compile_query(&query, &columns)?;
    Ok(json!({
        "success": true,
        "match_expression": compiled.match_expression,
    }))
}

pub async fn search(state: &AppState, params: &Value) -> Result<Value> {
    let query = require_str_param(params, "query", "query")?;
    let table = require_str_param(params, "table", "table")?;
    let columns = require_str_array_param(params, "columns", "columns")?;
    let limit = get_u64_param(params, "limit", "limit")?
        .map(|l| l as usize)
        .unwrap_or(SearchConfig::DEFAULT_ROW_LIMIT);

    let request = SearchRequest::new(query, table, columns).with_limit(limit);
    let outcome = state.api.search_with(&request).await?;

    Ok(json!({
        "success": true,
        "columns": outcome.columns,
        "rows": serde_json::to_value(&outcome.rows)?,
        "match_expression": outcome.match_expression,
        "query_time_ms": outcome.query_time_ms,
    }))
}
