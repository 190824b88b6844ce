//! Reads identifiers back from the database's own catalog.
//!
//! Table names are only ever passed to these statements as bound values.

use super::types::{ColumnDescriptor, DeclaredType};
use crate::{Result, SearchError};
use rusqlite::{params, Connection, OptionalExtension};

/// Kind of a table object found in `sqlite_master`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// An ordinary rowid or WITHOUT ROWID table.
    Ordinary,
    /// A virtual table created with `USING fts5`.
    Fts5,
    /// Any other virtual table.
    OtherVirtual,
}

impl TableKind {
    fn from_create_sql(sql: &str) -> Self {
        let upper = sql.to_ascii_uppercase();
        if !upper.trim_start().starts_with("CREATE VIRTUAL TABLE") {
            return TableKind::Ordinary;
        }
        let mut words = upper.split_whitespace().skip_while(|w| *w != "USING");
        let module = words.nth(1).unwrap_or("");
        let name: String = module
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if name == "FTS5" {
            TableKind::Fts5
        } else {
            TableKind::OtherVirtual
        }
    }
}

/// List every FTS5 virtual table, ordered by name.
pub fn read_fts_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT name, sql FROM sqlite_master
             WHERE type = 'table' AND sql LIKE 'CREATE VIRTUAL TABLE%'
             ORDER BY name",
        )
        .map_err(SearchError::catalog)?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(SearchError::catalog)?;

    let mut tables = Vec::new();
    for row in rows {
        let (name, sql) = row.map_err(SearchError::catalog)?;
        if TableKind::from_create_sql(&sql) == TableKind::Fts5 {
            tables.push(name);
        }
    }

    Ok(tables)
}

/// Read the columns of `table` in declaration order.
///
/// Callers must have checked `table` against the whitelist (or the catalog)
/// first; the name is bound, not interpolated, but an unvetted name must
/// never reach introspection at all.
pub fn read_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnDescriptor>> {
    let mut stmt = conn
        .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(SearchError::catalog)?;

    let rows = stmt
        .query_map(params![table], |row| {
            let name: String = row.get(0)?;
            let decl: Option<String> = row.get(1)?;
            Ok(ColumnDescriptor::new(
                name,
                DeclaredType::from_declared(decl.as_deref().unwrap_or("")),
            ))
        })
        .map_err(SearchError::catalog)?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(SearchError::catalog)
}

/// Look up a table by exact name.
pub fn table_kind(conn: &Connection, table: &str) -> Result<Option<TableKind>> {
    let sql: Option<Option<String>> = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()
        .map_err(SearchError::catalog)?;

    Ok(sql.map(|sql| TableKind::from_create_sql(sql.as_deref().unwrap_or(""))))
}
