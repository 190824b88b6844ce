//! FTS5 index handlers.

use super::{get_bool_param, get_str_array_param, get_str_param, require_str_param};
use crate::server::AppState;
use serde_json::{json, Value};
use sqlite_search::{Fts5IndexSpec, FtsColumns, Result, SearchError};

pub async fn create_fts_index(state: &AppState, params: &Value) -> Result<Value> {
    let spec = parse_index_spec(params)?;
    let report = state.api.create_fts_index(spec).await?;
    Ok(serde_json::to_value(report)?)
}

pub async fn optimize_fts_index(state: &AppState, params: &Value) -> Result<Value> {
    let table = require_str_param(params, "table", "table")?;
    state.api.optimize_fts_index(&table).await?;
    Ok(json!(true))
}

pub async fn rebuild_fts_index(state: &AppState, params: &Value) -> Result<Value> {
    let table = require_str_param(params, "table", "table")?;
    state.api.rebuild_fts_index(&table).await?;
    Ok(json!(true))
}

fn parse_index_spec(params: &Value) -> Result<Fts5IndexSpec> {
    let mut spec = Fts5IndexSpec::new(require_str_param(params, "source_table", "sourceTable")?);

    spec.fts_table = get_str_param(params, "fts_table", "ftsTable").map(String::from);
    spec.tokenizer = get_str_param(params, "tokenizer", "tokenizer").map(String::from);
    if let Some(columns) = get_str_array_param(params, "columns", "columns")? {
        spec.columns = FtsColumns::Named(columns);
    }
    if let Some(external) = get_bool_param(params, "external_content", "externalContent") {
        spec.external_content = external;
    }
    if let Some(prefix) = params.get("prefix").filter(|v| !v.is_null()) {
        spec.prefix = prefix
            .as_array()
            .and_then(|values| {
                values
                    .iter()
                    .map(|v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
                    .collect::<Option<Vec<_>>>()
            })
            .ok_or_else(|| SearchError::InvalidParams {
                message: "prefix must be an array of integers".to_string(),
            })?;
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_spec_defaults() {
        let spec = parse_index_spec(&json!({"source_table": "genes"})).unwrap();
        assert_eq!(spec.source_table, "genes");
        assert_eq!(spec.fts_table_name(), "genes_fts");
        assert_eq!(spec.columns, FtsColumns::All);
        assert!(spec.external_content);
        assert!(spec.prefix.is_empty());
    }

    #[test]
    fn test_parse_index_spec_full() {
        let spec = parse_index_spec(&json!({
            "sourceTable": "genes",
            "ftsTable": "gene_search",
            "columns": ["symbol", "summary"],
            "tokenizer": "trigram",
            "prefix": [2, 3],
            "externalContent": false,
        }))
        .unwrap();
        assert_eq!(spec.fts_table.as_deref(), Some("gene_search"));
        assert_eq!(
            spec.columns,
            FtsColumns::Named(vec!["symbol".into(), "summary".into()])
        );
        assert_eq!(spec.tokenizer.as_deref(), Some("trigram"));
        assert_eq!(spec.prefix, vec![2, 3]);
        assert!(!spec.external_content);
    }

    #[test]
    fn test_parse_index_spec_rejects_bad_prefix() {
        let result = parse_index_spec(&json!({"source_table": "genes", "prefix": ["two"]}));
        assert!(matches!(result, Err(SearchError::InvalidParams { .. })));
        assert!(parse_index_spec(&json!({})).is_err());
    }
}
