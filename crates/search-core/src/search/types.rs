//! Search request and result types.

use rusqlite::types::ValueRef;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One search invocation. Constructed per call, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub raw_term: String,
    pub table: String,
    pub columns: Vec<String>,
    /// Maximum rows to return; `None` returns every match.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(
        raw_term: impl Into<String>,
        table: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            raw_term: raw_term.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A single cell value as stored by SQLite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Integer(i),
            ValueRef::Real(f) => CellValue::Real(f),
            ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => CellValue::Blob(bytes.to_vec()),
        }
    }
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One matching row: its rowid and the column → value cells in table order.
///
/// Serializes as `{"rowid": n, "cells": {col: value, ...}}` with the cells
/// object keeping column order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRow {
    pub rowid: i64,
    pub cells: Vec<(String, CellValue)>,
}

impl SearchRow {
    /// Value of `column`, if the row has it.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

struct OrderedCells<'a>(&'a [(String, CellValue)]);

impl Serialize for OrderedCells<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for SearchRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("rowid", &self.rowid)?;
        map.serialize_entry("cells", &OrderedCells(&self.cells))?;
        map.end()
    }
}

/// Result of a successful search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Projected columns, in table order.
    pub columns: Vec<String>,
    /// Matching rows, best rank first.
    pub rows: Vec<SearchRow>,
    /// The match expression that was bound.
    pub match_expression: String,
    pub query_time_ms: f64,
}
