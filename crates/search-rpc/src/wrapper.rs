//! Response wrapping for frontend compatibility.
//!
//! The frontend expects every result in the form `{success: bool, ...data}`.
//! Handlers return raw data; this module adds the envelope.

use serde_json::{json, Value};

/// Wrap a handler result in the envelope the frontend expects.
pub fn wrap_response(method: &str, result: Value) -> Value {
    match method {
        // List wrappers
        "connect" | "refresh_whitelist" => {
            json!({
                "success": true,
                "tables": if result.is_null() { json!([]) } else { result }
            })
        }

        "list_columns" | "select_table" => {
            json!({
                "success": true,
                "columns": if result.is_null() { json!([]) } else { result }
            })
        }

        // Dict wrappers
        "create_fts_index" => {
            json!({
                "success": true,
                "report": if result.is_null() { json!({}) } else { result }
            })
        }

        // Bool methods
        "disconnect" | "optimize_fts_index" | "rebuild_fts_index" => {
            json!({
                "success": result.as_bool().unwrap_or(false)
            })
        }

        // Passthrough methods (handler returns {success, ...} directly)
        "connection_status" | "compile_query" | "search" => result,

        _ => result,
    }
}
