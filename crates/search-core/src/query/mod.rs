//! FTS5 query compilation.
//!
//! This module provides:
//! - A scanner for boolean keywords and `NEAR(...)` groups
//! - The term compiler (literal vs. structured mode)
//! - Column-filter assembly around a compiled term

mod column_filter;
mod compiler;
mod scanner;

pub use column_filter::{build_match, CompiledQuery};
pub use compiler::{
    compile_term, detect_mode, has_special_chars, is_quoted_phrase, quote_literal, QueryMode,
    SPECIAL_CHARS,
};
pub use scanner::{scan, BoolOp, Token};

use crate::Result;

/// Compile `raw_term` and scope it to `columns`.
pub fn compile_query<S: AsRef<str>>(raw_term: &str, columns: &[S]) -> Result<CompiledQuery> {
    build_match(columns, &compile_term(raw_term))
}
