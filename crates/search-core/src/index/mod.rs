//! FTS5 index creation and maintenance.
//!
//! This module provides:
//! - Building an FTS5 table over an ordinary table
//! - The `optimize` and `rebuild` maintenance commands

mod fts5;

pub use fts5::{
    create_index, run_command, validate_prefix, validate_tokenizer, Fts5Command,
    Fts5IndexReport, Fts5IndexSpec, FtsColumns,
};
