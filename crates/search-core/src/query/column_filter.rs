//! Column-scoped match expression assembly.

use super::compiler::{is_bareword, quote_literal};
use crate::{Result, SearchError};
use serde::{Deserialize, Serialize};

/// A match expression ready to be bound as the `MATCH` operand.
///
/// Carries no SQL identifiers of its own; the table name is interpolated
/// separately after it passes the whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledQuery {
    pub match_expression: String,
}

impl CompiledQuery {
    pub fn as_str(&self) -> &str {
        &self.match_expression
    }
}

impl std::fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.match_expression)
    }
}

/// Build `{col1 col2 ...}: <term>` from whitelisted columns and a compiled term.
///
/// Column names that are not FTS5 barewords are written as quoted strings.
pub fn build_match<S: AsRef<str>>(columns: &[S], term: &str) -> Result<CompiledQuery> {
    if columns.is_empty() {
        return Err(SearchError::EmptyColumnSet);
    }
    if term.trim().is_empty() {
        return Err(SearchError::EmptyTerm);
    }

    let column_list = columns
        .iter()
        .map(|c| {
            let name = c.as_ref();
            if is_bareword(name) {
                name.to_string()
            } else {
                quote_literal(name)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    Ok(CompiledQuery {
        match_expression: format!("{{{}}}: {}", column_list, term),
    })
}
