//! FTS5 virtual table creation and maintenance.

use crate::config::Fts5Config;
use crate::db::quote_identifier;
use crate::schema::catalog::{self, TableKind};
use crate::schema::DeclaredType;
use crate::{Result, SearchError};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Which source columns go into the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FtsColumns {
    /// Every column declared with a text type.
    #[default]
    All,
    /// These columns, in this order.
    Named(Vec<String>),
}

/// Options for building an FTS5 table over an ordinary table.
#[derive(Debug, Clone)]
pub struct Fts5IndexSpec {
    pub source_table: String,
    /// Defaults to `<source_table>_fts`.
    pub fts_table: Option<String>,
    pub columns: FtsColumns,
    /// Defaults to `porter unicode61`.
    pub tokenizer: Option<String>,
    /// Prefix index lengths.
    pub prefix: Vec<u32>,
    /// Point the index at the source table instead of copying rows into it.
    pub external_content: bool,
}

impl Fts5IndexSpec {
    pub fn new(source_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            fts_table: None,
            columns: FtsColumns::All,
            tokenizer: None,
            prefix: Vec::new(),
            external_content: true,
        }
    }

    pub fn with_fts_table(mut self, name: impl Into<String>) -> Self {
        self.fts_table = Some(name.into());
        self
    }

    pub fn with_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = FtsColumns::Named(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Into<String>) -> Self {
        self.tokenizer = Some(tokenizer.into());
        self
    }

    pub fn with_prefix(mut self, lengths: impl IntoIterator<Item = u32>) -> Self {
        self.prefix = lengths.into_iter().collect();
        self
    }

    pub fn with_external_content(mut self, external: bool) -> Self {
        self.external_content = external;
        self
    }

    /// Name of the FTS5 table to create.
    pub fn fts_table_name(&self) -> String {
        self.fts_table
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.source_table, Fts5Config::TABLE_SUFFIX))
    }

    fn tokenizer(&self) -> &str {
        self.tokenizer
            .as_deref()
            .unwrap_or(Fts5Config::DEFAULT_TOKENIZER)
    }
}

/// Result of a successful index build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fts5IndexReport {
    pub fts_table: String,
    pub indexed_columns: Vec<String>,
    pub row_count: i64,
}

/// FTS5 special commands issued through the table's hidden column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fts5Command {
    /// Merge all index b-trees into one.
    Optimize,
    /// Discard the index and rebuild it from the content.
    Rebuild,
}

impl Fts5Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fts5Command::Optimize => "optimize",
            Fts5Command::Rebuild => "rebuild",
        }
    }
}

fn validation(field: &str, message: impl Into<String>) -> SearchError {
    SearchError::Validation {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Check a `tokenize=` value.
pub fn validate_tokenizer(tokenizer: &str) -> Result<()> {
    let mut words = tokenizer.split_whitespace();
    let Some(first) = words.next() else {
        return Err(validation("tokenizer", "tokenizer is empty"));
    };
    if !Fts5Config::KNOWN_TOKENIZERS.contains(&first) {
        return Err(validation(
            "tokenizer",
            format!("unknown tokenizer '{}'", first),
        ));
    }
    let valid_word = |w: &str| w.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if let Some(bad) = std::iter::once(first).chain(words).find(|w| !valid_word(w)) {
        return Err(validation(
            "tokenizer",
            format!("invalid tokenizer argument '{}'", bad),
        ));
    }
    Ok(())
}

/// Check `prefix=` lengths.
pub fn validate_prefix(lengths: &[u32]) -> Result<()> {
    match lengths
        .iter()
        .find(|&&l| l == 0 || l > Fts5Config::MAX_PREFIX_LENGTH)
    {
        Some(bad) => Err(validation(
            "prefix",
            format!(
                "prefix length {} outside 1..={}",
                bad,
                Fts5Config::MAX_PREFIX_LENGTH
            ),
        )),
        None => Ok(()),
    }
}

/// Build an FTS5 table as described by `spec`.
///
/// Expects to run inside a transaction; a failure at any step leaves the
/// database as it was once the caller rolls back.
pub fn create_index(conn: &Connection, spec: &Fts5IndexSpec) -> Result<Fts5IndexReport> {
    let source = spec.source_table.as_str();
    let fts_table = spec.fts_table_name();
    let tokenizer = spec.tokenizer();

    validate_tokenizer(tokenizer)?;
    validate_prefix(&spec.prefix)?;

    if catalog::table_kind(conn, source)? != Some(TableKind::Ordinary) {
        return Err(SearchError::UnknownTable {
            table: source.to_string(),
        });
    }

    if fts_table.is_empty() || fts_table.to_ascii_lowercase().starts_with("sqlite_") {
        return Err(validation("fts_table", format!("invalid table name '{}'", fts_table)));
    }
    if fts_table == source {
        return Err(validation(
            "fts_table",
            "index table must differ from the source table",
        ));
    }

    let indexed_columns = select_columns(conn, source, &spec.columns)?;

    match catalog::table_kind(conn, &fts_table)? {
        None => {}
        Some(TableKind::Fts5) => {
            conn.execute_batch(&format!("DROP TABLE {};", quote_identifier(&fts_table)))?;
            debug!("Dropped existing FTS5 table {}", fts_table);
        }
        Some(_) => {
            return Err(validation(
                "fts_table",
                format!("'{}' exists and is not an FTS5 table", fts_table),
            ));
        }
    }

    conn.execute_batch(&create_statement(spec, &fts_table, &indexed_columns))?;

    let fts = quote_identifier(&fts_table);
    if spec.external_content {
        conn.execute(&format!("INSERT INTO {fts}({fts}) VALUES('rebuild')"), [])?;
    } else {
        let column_list = indexed_columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute(
            &format!(
                "INSERT INTO {}(rowid, {}) SELECT rowid, {} FROM {}",
                fts,
                column_list,
                column_list,
                quote_identifier(source)
            ),
            [],
        )?;
    }

    let row_count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", fts), [], |row| {
        row.get(0)
    })?;

    info!(
        "Created FTS5 table {} over {} ({} columns, {} rows)",
        fts_table,
        source,
        indexed_columns.len(),
        row_count
    );

    Ok(Fts5IndexReport {
        fts_table,
        indexed_columns,
        row_count,
    })
}

fn select_columns(conn: &Connection, source: &str, selection: &FtsColumns) -> Result<Vec<String>> {
    let available = catalog::read_columns(conn, source)?;

    let selected = match selection {
        FtsColumns::All => available
            .iter()
            .filter(|c| c.declared_type == DeclaredType::Text)
            .map(|c| c.name.clone())
            .collect::<Vec<_>>(),
        FtsColumns::Named(names) => {
            let mut seen = HashSet::new();
            for name in names {
                if !available.iter().any(|c| &c.name == name) {
                    return Err(SearchError::UnknownColumn {
                        table: source.to_string(),
                        column: name.clone(),
                    });
                }
                if !seen.insert(name.as_str()) {
                    return Err(validation("columns", format!("column '{}' listed twice", name)));
                }
            }
            names.clone()
        }
    };

    if selected.is_empty() {
        return Err(SearchError::EmptyColumnSet);
    }
    Ok(selected)
}

fn create_statement(spec: &Fts5IndexSpec, fts_table: &str, columns: &[String]) -> String {
    let mut args: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();

    args.push(format!("tokenize='{}'", spec.tokenizer()));
    if !spec.prefix.is_empty() {
        let lengths = spec
            .prefix
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        args.push(format!("prefix='{}'", lengths));
    }
    if spec.external_content {
        args.push(format!(
            "content='{}'",
            spec.source_table.replace('\'', "''")
        ));
        args.push("content_rowid='rowid'".to_string());
    }

    format!(
        "CREATE VIRTUAL TABLE {} USING fts5({});",
        quote_identifier(fts_table),
        args.join(", ")
    )
}

/// Issue an FTS5 maintenance command against `table`.
///
/// `table` must already be whitelisted.
pub fn run_command(conn: &Connection, table: &str, command: Fts5Command) -> Result<()> {
    let fts = quote_identifier(table);
    conn.execute(
        &format!("INSERT INTO {fts}({fts}) VALUES('{}')", command.as_str()),
        [],
    )?;
    debug!("Ran FTS5 {} on {}", command.as_str(), table);
    Ok(())
}
