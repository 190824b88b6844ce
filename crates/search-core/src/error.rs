//! Error types for sqlite-search.
//!
//! Every failure is terminal to the request that triggered it. The core never
//! retries; callers decide how to present or retry.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the search core.
#[derive(Debug, Error)]
pub enum SearchError {
    // Connection errors
    #[error("No database connection is open")]
    NotConnected,

    #[error("Failed to open database {path:?}: {message}")]
    Connection { path: PathBuf, message: String },

    // Catalog errors
    #[error("Failed to read database catalog: {message}")]
    CatalogRead {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Whitelist rejections
    #[error("Unknown table: {table}")]
    UnknownTable { table: String },

    #[error("Unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    // Malformed requests
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("No columns selected")]
    EmptyColumnSet,

    #[error("Compiled search term is empty")]
    EmptyTerm,

    // Engine errors
    #[error("Full-text engine rejected the query: {message}")]
    EngineSyntax { message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

impl From<std::io::Error> for SearchError {
    fn from(err: std::io::Error) -> Self {
        SearchError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(err: rusqlite::Error) -> Self {
        SearchError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl SearchError {
    /// Wrap a storage fault raised while reading catalog metadata.
    pub fn catalog(err: rusqlite::Error) -> Self {
        SearchError::CatalogRead {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Stable snake_case tag for the error class.
    ///
    /// UI layers key their presentation off this instead of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::NotConnected => "not_connected",
            SearchError::Connection { .. } => "connection",
            SearchError::CatalogRead { .. } => "catalog_read",
            SearchError::UnknownTable { .. } => "unknown_table",
            SearchError::UnknownColumn { .. } => "unknown_column",
            SearchError::EmptyQuery => "empty_query",
            SearchError::EmptyColumnSet => "empty_column_set",
            SearchError::EmptyTerm => "empty_term",
            SearchError::EngineSyntax { .. } => "engine_syntax",
            SearchError::Database { .. } => "database",
            SearchError::Validation { .. } => "validation",
            SearchError::InvalidParams { .. } => "invalid_params",
            SearchError::Io { .. } => "io",
            SearchError::Json { .. } => "json",
            SearchError::Other(_) => "other",
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32000: Connection error
    /// - -32001: Not connected
    /// - -32002: Unknown table or column
    /// - -32003: Catalog read failure
    /// - -32004: Engine rejected the match expression
    /// - -32005: Validation error / malformed request
    /// - -32602: Invalid params
    /// - -32603: Internal error
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            SearchError::Connection { .. } => -32000,
            SearchError::NotConnected => -32001,
            SearchError::UnknownTable { .. } | SearchError::UnknownColumn { .. } => -32002,
            SearchError::CatalogRead { .. } => -32003,
            SearchError::EngineSyntax { .. } => -32004,

            SearchError::EmptyQuery
            | SearchError::EmptyColumnSet
            | SearchError::EmptyTerm
            | SearchError::Validation { .. } => -32005,

            SearchError::InvalidParams { .. } => -32602,

            _ => -32603,
        }
    }

    /// Whether the error rejects the caller's request rather than reporting a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SearchError::UnknownTable { .. }
                | SearchError::UnknownColumn { .. }
                | SearchError::EmptyQuery
                | SearchError::EmptyColumnSet
                | SearchError::EmptyTerm
                | SearchError::NotConnected
                | SearchError::InvalidParams { .. }
                | SearchError::Validation { .. }
        )
    }
}
