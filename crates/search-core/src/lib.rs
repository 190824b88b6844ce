//! SQLite Search - headless full-text search over user-chosen SQLite databases.
//!
//! This crate lets a collaborator point at a SQLite database, pick one of its
//! FTS5 tables and a subset of its columns, and run free-text queries against
//! it. Table and column names are only interpolated into SQL after they have
//! been read back from the database's own catalog; the search text is compiled
//! into valid FTS5 syntax and always bound as a value.
//!
//! It can be used programmatically without any HTTP/RPC layer; see the
//! `sqlite-search-rpc` crate for the JSON-RPC server.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlite_search::SearchApi;
//!
//! #[tokio::main]
//! async fn main() -> sqlite_search::Result<()> {
//!     let api = SearchApi::open("/path/to/genes.db").await?;
//!
//!     // FTS5 tables found in the catalog
//!     let tables = api.refresh_whitelist().await?;
//!     println!("Found {} searchable tables", tables.len());
//!
//!     // Search two columns of the first one
//!     let outcome = api
//!         .search("BRCA1 AND NM_007294.4", &tables[0], &["symbol", "accession"])
//!         .await?;
//!     println!("{} rows for {}", outcome.rows.len(), outcome.match_expression);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod query;
pub mod schema;
pub mod search;

mod api;

// Re-export commonly used types
pub use db::Database;
pub use error::{Result, SearchError};
pub use index::{Fts5IndexReport, Fts5IndexSpec, FtsColumns};
pub use query::{compile_query, compile_term, CompiledQuery};
pub use schema::{ColumnDescriptor, DeclaredType, SchemaCache};
pub use search::{CellValue, SearchOutcome, SearchRequest, SearchRow};

use api::ApiState;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Main API struct for search operations.
///
/// Owns the single active connection and the schema whitelist built from it.
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct SearchApi {
    state: Arc<ApiState>,
}

impl Default for SearchApi {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchApi {
    /// Create an API with no database attached.
    pub fn new() -> Self {
        Self {
            state: Arc::new(ApiState::new()),
        }
    }

    /// Create an API and connect it to the database at `path`.
    ///
    /// The whitelist is populated before this returns.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let api = Self::new();
        let path = path.into();
        api.on_connection_changed(Some(path.as_path())).await?;
        Ok(api)
    }
}

/// Diagnostic snapshot of the active connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub path: PathBuf,
    pub generation: u64,
    pub whitelist_size: usize,
    /// Storage calls issued on this connection so far.
    pub storage_calls: u64,
}
