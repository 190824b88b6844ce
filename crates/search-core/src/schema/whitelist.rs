//! Identifier whitelist and column descriptor cache.
//!
//! The whitelist and the column cache live in one immutable snapshot behind a
//! lock. Every mutation builds a new snapshot and swaps it in under the write
//! guard, so a reader sees either the state before a refresh or the state
//! after it, never a mix.

use super::catalog;
use super::types::ColumnDescriptor;
use crate::db::Database;
use crate::{Result, SearchError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use tracing::{debug, warn};

/// Tables known to be FTS5-indexed on one connection generation.
#[derive(Debug, Default)]
pub struct TableWhitelist {
    generation: u64,
    populated: bool,
    tables: Vec<String>,
    lookup: HashSet<String>,
}

impl TableWhitelist {
    fn empty(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    fn populated(generation: u64, tables: Vec<String>) -> Self {
        let lookup = tables.iter().cloned().collect();
        Self {
            generation,
            populated: true,
            tables,
            lookup,
        }
    }

    /// Connection generation the snapshot belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a catalog refresh has been installed for this generation.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Table names in catalog order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn contains(&self, table: &str) -> bool {
        self.lookup.contains(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

type ColumnMap = HashMap<String, Arc<[ColumnDescriptor]>>;

/// Whitelist and column descriptors, replaced together.
#[derive(Clone)]
struct SchemaSnapshot {
    whitelist: Arc<TableWhitelist>,
    columns: ColumnMap,
}

impl SchemaSnapshot {
    fn empty(generation: u64) -> Self {
        Self {
            whitelist: Arc::new(TableWhitelist::empty(generation)),
            columns: ColumnMap::new(),
        }
    }
}

/// The only path by which a table or column name becomes eligible for
/// interpolation into a statement.
pub struct SchemaCache {
    state: RwLock<Arc<SchemaSnapshot>>,
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCache {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Arc::new(SchemaSnapshot::empty(0))),
        }
    }

    fn current(&self) -> Arc<SchemaSnapshot> {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<SchemaSnapshot>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current whitelist snapshot.
    pub fn snapshot(&self) -> Arc<TableWhitelist> {
        Arc::clone(&self.current().whitelist)
    }

    /// Drop everything and start an empty whitelist for `generation`.
    pub fn reset(&self, generation: u64) {
        *self.write() = Arc::new(SchemaSnapshot::empty(generation));
        debug!("Schema cache reset for generation {}", generation);
    }

    /// True if `name` is in the current whitelist.
    pub fn is_known_table(&self, name: &str) -> bool {
        self.snapshot().contains(name)
    }

    /// True only if `table` is whitelisted, its columns are cached, and every
    /// name in `names` is one of them.
    pub fn are_known_columns<S: AsRef<str>>(&self, table: &str, names: &[S]) -> bool {
        let current = self.current();
        if !current.whitelist.contains(table) {
            return false;
        }
        match current.columns.get(table) {
            Some(columns) => names
                .iter()
                .all(|name| columns.iter().any(|c| c.name == name.as_ref())),
            None => false,
        }
    }

    /// Cached descriptors for `table`, if present.
    pub fn cached_columns(&self, table: &str) -> Option<Arc<[ColumnDescriptor]>> {
        self.current().columns.get(table).cloned()
    }

    /// Evict the cached descriptors for one table.
    pub fn evict_table(&self, table: &str) {
        let mut guard = self.write();
        if !guard.columns.contains_key(table) {
            return;
        }
        let mut next = (**guard).clone();
        next.columns.remove(table);
        *guard = Arc::new(next);
        debug!("Evicted cached columns for {}", table);
    }

    /// Re-read the FTS5 table list from the catalog and install it.
    ///
    /// All cached column descriptors are invalidated. If a newer connection
    /// took over while the catalog was being read, the result is discarded.
    pub async fn refresh_tables(&self, db: &Database) -> Result<Vec<String>> {
        let generation = db.generation();
        let tables = db.call(|conn| catalog::read_fts_tables(conn)).await?;

        let mut guard = self.write();
        if guard.whitelist.generation() != generation {
            drop(guard);
            warn!(
                "Discarding table refresh for generation {}: connection changed",
                generation
            );
            return Err(SearchError::NotConnected);
        }

        *guard = Arc::new(SchemaSnapshot {
            whitelist: Arc::new(TableWhitelist::populated(generation, tables.clone())),
            columns: ColumnMap::new(),
        });
        drop(guard);
        debug!("Whitelist refreshed: {} FTS5 tables", tables.len());

        Ok(tables)
    }

    /// Cached descriptors for `table`, reading them from the catalog on a miss.
    ///
    /// The whitelist gate runs before any catalog statement sees `table`.
    pub async fn columns_for(&self, db: &Database, table: &str) -> Result<Arc<[ColumnDescriptor]>> {
        let gated_on = self.current();
        let whitelist = Arc::clone(&gated_on.whitelist);
        if whitelist.generation() != db.generation() || !whitelist.contains(table) {
            return Err(SearchError::UnknownTable {
                table: table.to_string(),
            });
        }

        if let Some(columns) = gated_on.columns.get(table) {
            debug!("Column cache hit for {}", table);
            return Ok(Arc::clone(columns));
        }

        let name = table.to_string();
        let columns: Arc<[ColumnDescriptor]> = db
            .call(move |conn| catalog::read_columns(conn, &name))
            .await?
            .into();

        // Install only if the whitelist this lookup was gated on is still current.
        let mut guard = self.write();
        if Arc::ptr_eq(&guard.whitelist, &whitelist) && !guard.columns.contains_key(table) {
            let mut next = (**guard).clone();
            next.columns.insert(table.to_string(), Arc::clone(&columns));
            *guard = Arc::new(next);
        }

        Ok(columns)
    }
}
