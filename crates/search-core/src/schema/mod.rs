//! Schema whitelist: the set of identifiers that may be interpolated into SQL.
//!
//! This module provides:
//! - Catalog reads for FTS5 tables and their columns
//! - The generation-tagged whitelist and column descriptor cache

pub mod catalog;
mod types;
mod whitelist;

pub use catalog::TableKind;
pub use types::{ColumnDescriptor, DeclaredType};
pub use whitelist::{SchemaCache, TableWhitelist};
