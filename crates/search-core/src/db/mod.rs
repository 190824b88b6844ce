//! Database connection handling.

mod connection;

pub use connection::Database;

/// Quote an SQL identifier, doubling embedded quotes.
///
/// Only ever applied to names that already passed the whitelist.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
