//! Column descriptor types.

use serde::{Deserialize, Serialize};

/// Declared type of a column, reduced to SQLite's affinity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeclaredType {
    Text,
    Integer,
    Real,
    Blob,
    Other,
}

impl DeclaredType {
    /// Classify a declared column type using SQLite's affinity rules.
    ///
    /// FTS5 columns carry no declared type and land in `Other`.
    pub fn from_declared(decl: &str) -> Self {
        let upper = decl.to_ascii_uppercase();

        if upper.contains("INT") {
            DeclaredType::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            DeclaredType::Text
        } else if upper.contains("BLOB") {
            DeclaredType::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            DeclaredType::Real
        } else {
            DeclaredType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeclaredType::Text => "TEXT",
            DeclaredType::Integer => "INTEGER",
            DeclaredType::Real => "REAL",
            DeclaredType::Blob => "BLOB",
            DeclaredType::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A column of a whitelisted table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: DeclaredType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }
}
