//! Centralized configuration for sqlite-search.
//!
//! Constants for connection setup, search execution and FTS5 index creation.

use std::time::Duration;

/// Connection configuration.
pub struct DatabaseConfig;

impl DatabaseConfig {
    /// How long a statement waits on a locked database before failing.
    pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
    /// Probe run right after opening; fails fast on files that are not SQLite databases.
    pub const VALIDATION_PROBE: &'static str = "SELECT COUNT(*) FROM sqlite_master";
}

/// Search execution configuration.
pub struct SearchConfig;

impl SearchConfig {
    /// Row limit applied by the RPC layer when the caller does not pass one.
    pub const DEFAULT_ROW_LIMIT: usize = 500;
    /// Upper bound on any requested row limit.
    pub const MAX_ROW_LIMIT: usize = 100_000;
}

/// FTS5 index creation defaults.
pub struct Fts5Config;

impl Fts5Config {
    /// Porter stemming over the unicode61 tokenizer.
    pub const DEFAULT_TOKENIZER: &'static str = "porter unicode61";
    /// Suffix appended to the source table name when no FTS table name is given.
    pub const TABLE_SUFFIX: &'static str = "_fts";
    /// Tokenizers that may start a `tokenize=` option.
    pub const KNOWN_TOKENIZERS: [&'static str; 4] = ["unicode61", "ascii", "porter", "trigram"];
    /// Largest prefix index length accepted by `prefix=`.
    pub const MAX_PREFIX_LENGTH: u32 = 255;
}
