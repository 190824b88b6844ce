//! The single path from a search request to a database call.
//!
//! Gates run in a fixed order and each failure short-circuits the rest:
//! connection, empty query, table whitelist, column whitelist, compilation,
//! execution. Nothing reaches storage until the identifiers have passed.

use super::types::{CellValue, SearchOutcome, SearchRequest, SearchRow};
use crate::config::SearchConfig;
use crate::db::{quote_identifier, Database};
use crate::query::{build_match, compile_term};
use crate::schema::{ColumnDescriptor, SchemaCache};
use crate::{Result, SearchError};
use rusqlite::{params, Connection};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Executes search requests against the active connection.
pub struct SearchGateway<'a> {
    schema: &'a SchemaCache,
}

impl<'a> SearchGateway<'a> {
    pub fn new(schema: &'a SchemaCache) -> Self {
        Self { schema }
    }

    /// Run `request` against `db`.
    pub async fn execute(
        &self,
        db: Option<Arc<Database>>,
        request: &SearchRequest,
    ) -> Result<SearchOutcome> {
        let start = Instant::now();

        let db = db.ok_or(SearchError::NotConnected)?;

        if request.raw_term.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let whitelist = self.schema.snapshot();
        if whitelist.generation() != db.generation() || !whitelist.contains(&request.table) {
            return Err(SearchError::UnknownTable {
                table: request.table.clone(),
            });
        }

        let table_columns = self.schema.columns_for(&db, &request.table).await?;
        if let Some(column) = request
            .columns
            .iter()
            .find(|c| !table_columns.iter().any(|d| &d.name == *c))
        {
            return Err(SearchError::UnknownColumn {
                table: request.table.clone(),
                column: column.clone(),
            });
        }

        let compiled = build_match(&request.columns, &compile_term(&request.raw_term))?;
        let match_expression = compiled.match_expression;
        debug!(
            "Search on {} with match expression {}",
            request.table, match_expression
        );

        let sql = select_statement(&request.table, &table_columns);
        let limit = request
            .limit
            .map_or(-1, |l| l.min(SearchConfig::MAX_ROW_LIMIT) as i64);
        let bound = match_expression.clone();
        let projection: Vec<String> = table_columns.iter().map(|c| c.name.clone()).collect();
        let names = projection.clone();

        let rows = db
            .call(move |conn| run_query(conn, &sql, &bound, limit, &names))
            .await
            .map_err(|e| match e {
                SearchError::EngineSyntax { message } => {
                    error!(
                        "FTS5 rejected compiled expression {:?}: {}",
                        match_expression, message
                    );
                    SearchError::EngineSyntax { message }
                }
                other => other,
            })?;

        Ok(SearchOutcome {
            columns: projection,
            rows,
            match_expression,
            query_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// Statement text for a whitelisted table; the match expression and limit are bound.
fn select_statement(table: &str, columns: &[ColumnDescriptor]) -> String {
    let table = quote_identifier(table);
    let mut projection = vec!["rowid".to_string()];
    projection.extend(columns.iter().map(|c| quote_identifier(&c.name)));

    format!(
        "SELECT {} FROM {} WHERE {} MATCH ?1 ORDER BY rank LIMIT ?2",
        projection.join(", "),
        table,
        table
    )
}

fn run_query(
    conn: &Connection,
    sql: &str,
    match_expression: &str,
    limit: i64,
    names: &[String],
) -> Result<Vec<SearchRow>> {
    let mut stmt = conn.prepare(sql).map_err(prepare_error)?;
    let mut rows = stmt
        .query(params![match_expression, limit])
        .map_err(engine_error)?;

    let mut results = Vec::new();
    while let Some(row) = rows.next().map_err(engine_error)? {
        let rowid: i64 = row.get(0)?;
        let mut cells = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let value = row.get_ref(i + 1)?;
            cells.push((name.clone(), CellValue::from(value)));
        }
        results.push(SearchRow { rowid, cells });
    }

    Ok(results)
}

/// Map a failure raised while preparing the statement.
///
/// The match expression is only seen once the statement runs, so a prepare
/// failure (a table or column dropped outside the core) is a storage fault
/// unless FTS5 itself raised it.
fn prepare_error(err: rusqlite::Error) -> SearchError {
    if is_fts5_message(&err) {
        syntax_error(err)
    } else {
        SearchError::from(err)
    }
}

/// Map a failure raised while binding or stepping the statement.
///
/// Plain `SQLITE_ERROR` at this stage is how FTS5 reports a match expression
/// it cannot parse; anything else is a storage fault.
fn engine_error(err: rusqlite::Error) -> SearchError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_ERROR =>
        {
            syntax_error(err)
        }
        _ if is_fts5_message(&err) => syntax_error(err),
        _ => SearchError::from(err),
    }
}

fn is_fts5_message(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(_, Some(message)) if message.starts_with("fts5:"))
}

fn syntax_error(err: rusqlite::Error) -> SearchError {
    let message = match &err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => message.clone(),
        _ => err.to_string(),
    };
    SearchError::EngineSyntax { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DeclaredType;

    #[test]
    fn test_select_statement_quotes_identifiers() {
        let columns = vec![
            ColumnDescriptor::new("title", DeclaredType::Other),
            ColumnDescriptor::new("first name", DeclaredType::Other),
        ];
        assert_eq!(
            select_statement("my docs", &columns),
            "SELECT rowid, \"title\", \"first name\" FROM \"my docs\" \
             WHERE \"my docs\" MATCH ?1 ORDER BY rank LIMIT ?2"
        );
    }

    #[test]
    fn test_engine_error_mapping() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE VIRTUAL TABLE t USING fts5(a)").unwrap();

        let err = conn
            .prepare("SELECT rowid FROM t WHERE t MATCH ?1")
            .and_then(|mut stmt| {
                stmt.query_row(params!["a AND"], |row| row.get::<_, i64>(0))
            })
            .unwrap_err();
        assert!(matches!(engine_error(err), SearchError::EngineSyntax { .. }));
    }

    #[test]
    fn test_missing_table_is_storage_fault() {
        let conn = Connection::open_in_memory().unwrap();
        let names = vec!["title".to_string()];
        let result = run_query(
            &conn,
            "SELECT rowid, \"title\" FROM \"gone\" WHERE \"gone\" MATCH ?1 ORDER BY rank LIMIT ?2",
            "hello",
            -1,
            &names,
        );
        assert!(matches!(result, Err(SearchError::Database { .. })));
    }

    #[test]
    fn test_bad_match_expression_is_syntax_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE VIRTUAL TABLE t USING fts5(a)").unwrap();
        let names = vec!["a".to_string()];
        let result = run_query(
            &conn,
            "SELECT rowid, \"a\" FROM \"t\" WHERE \"t\" MATCH ?1 ORDER BY rank LIMIT ?2",
            "a AND",
            -1,
            &names,
        );
        assert!(matches!(result, Err(SearchError::EngineSyntax { .. })));
    }

    #[test]
    fn test_run_query_reads_cells() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE VIRTUAL TABLE t USING fts5(title, body);
             INSERT INTO t VALUES ('hello world', 'first');
             INSERT INTO t VALUES ('goodbye', 'second');",
        )
        .unwrap();

        let names = vec!["title".to_string(), "body".to_string()];
        let rows = run_query(
            &conn,
            "SELECT rowid, \"title\", \"body\" FROM \"t\" WHERE \"t\" MATCH ?1 ORDER BY rank LIMIT ?2",
            "{title}: hello",
            -1,
            &names,
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rowid, 1);
        assert_eq!(rows[0].get("body").and_then(CellValue::as_text), Some("first"));
    }
}
